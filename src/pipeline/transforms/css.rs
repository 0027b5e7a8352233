// src/pipeline/transforms/css.rs

//! In-process CSS minification built on lightningcss, plus browser target
//! handling shared with the external autoprefixer.

use std::collections::BTreeMap;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::errors::{ConfigurationError, Result, TransformError};
use crate::pipeline::transforms::map_each;
use crate::pipeline::{SourceFile, Transform};

/// Parse `[browsers]` entries such as `safari = "15.6"` into lightningcss
/// targets.
pub fn parse_browsers(
    entries: &BTreeMap<String, String>,
) -> std::result::Result<Browsers, ConfigurationError> {
    let mut browsers = Browsers::default();

    for (name, version) in entries {
        let encoded = encode_version(version).ok_or_else(|| {
            ConfigurationError::Invalid(format!(
                "browser '{name}' has invalid version {version:?}"
            ))
        })?;

        let slot = match name.as_str() {
            "android" => &mut browsers.android,
            "chrome" => &mut browsers.chrome,
            "edge" => &mut browsers.edge,
            "firefox" => &mut browsers.firefox,
            "ie" => &mut browsers.ie,
            "ios_saf" => &mut browsers.ios_saf,
            "opera" => &mut browsers.opera,
            "safari" => &mut browsers.safari,
            "samsung" => &mut browsers.samsung,
            other => {
                return Err(ConfigurationError::Invalid(format!(
                    "unknown browser '{other}' in [browsers]"
                )));
            }
        };
        *slot = Some(encoded);
    }

    Ok(browsers)
}

/// Render `[browsers]` entries as a browserslist query, e.g.
/// `chrome >= 109, safari >= 15.6`.
pub fn browserslist_query(entries: &BTreeMap<String, String>) -> String {
    entries
        .iter()
        .map(|(name, version)| format!("{name} >= {}", version.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"15.6"` -> `15 << 16 | 6 << 8`.
fn encode_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    let patch: u32 = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    if parts.next().is_some() || major > 0xff || minor > 0xff || patch > 0xff {
        return None;
    }
    Some((major << 16) | (minor << 8) | patch)
}

fn minify_css(
    stage: &str,
    file: &SourceFile,
    targets: Targets,
) -> std::result::Result<Vec<u8>, TransformError> {
    let fail = |message: String| TransformError::new(stage, &file.path, message);

    let code = std::str::from_utf8(&file.contents)
        .map_err(|e| fail(format!("stylesheet is not UTF-8: {e}")))?;
    let filename = file.path.to_string_lossy().into_owned();

    let mut sheet = StyleSheet::parse(
        code,
        ParserOptions {
            filename,
            ..ParserOptions::default()
        },
    )
    .map_err(|e| fail(e.to_string()))?;

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| fail(e.to_string()))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| fail(e.to_string()))?;

    Ok(printed.code.into_bytes())
}

/// Release-only CSS minification.
///
/// Declarations the configured browsers need prefixed come out prefixed.
#[derive(Debug, Clone, Default)]
pub struct CssMinify {
    targets: Targets,
}

impl CssMinify {
    pub fn new(browsers: Browsers) -> Self {
        Self {
            targets: Targets::from(browsers),
        }
    }
}

impl Transform for CssMinify {
    fn name(&self) -> &str {
        "minify-css"
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        map_each(files, |mut file| {
            file.contents = minify_css(self.name(), &file, self.targets)?;
            Ok(file)
        })
    }
}
