use std::ffi::OsStr;
use std::str::FromStr;

use serde::Deserialize;

/// Environment variable that selects release mode.
pub const RELEASE_ENV_VAR: &str = "RELEASE";

/// Release/development switch.
///
/// Read once at startup and passed by value into task construction; nothing
/// reads the environment after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildMode {
    release: bool,
}

impl BuildMode {
    pub const DEVELOPMENT: BuildMode = BuildMode { release: false };
    pub const RELEASE: BuildMode = BuildMode { release: true };

    /// Read [`RELEASE_ENV_VAR`] from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(RELEASE_ENV_VAR).as_deref())
    }

    /// Interpret a raw environment value.
    ///
    /// Absent, empty, `0`, `false`, `no` and `off` mean development; anything
    /// else means release.
    pub fn from_env_value(value: Option<&OsStr>) -> Self {
        let release = match value {
            None => false,
            Some(v) => {
                let v = v.to_string_lossy().trim().to_lowercase();
                !matches!(v.as_str(), "" | "0" | "false" | "no" | "off")
            }
        };
        Self { release }
    }

    pub fn is_release(&self) -> bool {
        self.release
    }

    pub fn label(&self) -> &'static str {
        if self.release { "release" } else { "development" }
    }
}

/// Where the release-mode source map goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// `<bundle>.map` next to the bundle, referenced by a trailing comment.
    File,
    /// Base64 data URL appended to the bundle itself.
    Inline,
}

impl Default for SourceMapMode {
    fn default() -> Self {
        SourceMapMode::File
    }
}

impl FromStr for SourceMapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(SourceMapMode::File),
            "inline" => Ok(SourceMapMode::Inline),
            other => Err(format!(
                "invalid source_map mode: {other} (expected \"file\" or \"inline\")"
            )),
        }
    }
}
