// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::SourceMapMode;

/// Configuration as read from TOML, before validation.
///
/// Every section is optional and defaults to the layout of the project this
/// pipeline was written for:
///
/// ```toml
/// [paths]
/// stylesheet_dir = "powerapp/project_static/less"
/// css_out = "powerapp/project_static/css"
///
/// [sources]
/// scripts = [
///     "node_modules/jquery/dist/jquery.js",
///     "node_modules/materialize-css/bin/materialize.js",
///     "powerapp/project_static/js_src/*.js",
/// ]
///
/// [tools]
/// stylesheet_compiler = ["lessc", "--include-path={include}", "-"]
/// autoprefixer = ["postcss", "--use", "autoprefixer", "--no-map"]
///
/// [browsers]
/// chrome = "109"
/// safari = "15.6"
///
/// [watch]
/// debounce_ms = 50
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub sources: SourcesSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub tools: ToolsSection,

    /// Browser name -> minimum version, used by the autoprefixer.
    #[serde(default = "default_browsers")]
    pub browsers: BTreeMap<String, String>,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (see
/// `config::validate`) or [`ConfigFile::default`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    paths: PathsSection,
    sources: SourcesSection,
    output: OutputSection,
    tools: ToolsSection,
    browsers: BTreeMap<String, String>,
    watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            sources: raw.sources,
            output: raw.output,
            tools: raw.tools,
            browsers: raw.browsers,
            watch: raw.watch,
        }
    }

    pub fn paths(&self) -> &PathsSection {
        &self.paths
    }

    pub fn sources(&self) -> &SourcesSection {
        &self.sources
    }

    pub fn output(&self) -> &OutputSection {
        &self.output
    }

    pub fn tools(&self) -> &ToolsSection {
        &self.tools
    }

    pub fn browsers(&self) -> &BTreeMap<String, String> {
        &self.browsers
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }
}

impl Default for ConfigFile {
    /// The built-in defaults always validate.
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile {
            browsers: default_browsers(),
            ..RawConfigFile::default()
        })
    }
}

/// `[paths]`: fixed directories, relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Directory holding the project's stylesheet sources. Also the include
    /// path handed to the stylesheet compiler.
    pub stylesheet_dir: PathBuf,

    /// Subdirectory of `stylesheet_dir` receiving the copied vendor stylesheets.
    pub library_subdir: PathBuf,

    /// Extension (without dot) of stylesheet sources, e.g. `less`.
    pub stylesheet_extension: String,

    pub css_out: PathBuf,
    pub js_out: PathBuf,
    pub font_out: PathBuf,
}

impl PathsSection {
    /// Destination of the incremental vendor stylesheet copy.
    pub fn library_dir(&self) -> PathBuf {
        self.stylesheet_dir.join(&self.library_subdir)
    }
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            stylesheet_dir: PathBuf::from("powerapp/project_static/less"),
            library_subdir: PathBuf::from("lib"),
            stylesheet_extension: "less".to_string(),
            css_out: PathBuf::from("powerapp/project_static/css"),
            js_out: PathBuf::from("powerapp/project_static/js"),
            font_out: PathBuf::from("powerapp/project_static/font"),
        }
    }
}

/// `[sources]`: ordered glob sets.
///
/// Order matters for `scripts`: later files rely on globals defined by
/// earlier ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesSection {
    pub vendor_stylesheets: Vec<String>,
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
    pub fonts: Vec<String>,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            vendor_stylesheets: vec!["node_modules/materialize-css/bin/*.css".to_string()],
            scripts: vec![
                "node_modules/jquery/dist/jquery.js".to_string(),
                "node_modules/materialize-css/bin/materialize.js".to_string(),
                "powerapp/project_static/js_src/*.js".to_string(),
            ],
            stylesheets: vec!["powerapp/project_static/less/*.less".to_string()],
            fonts: vec!["node_modules/materialize-css/font/**/*".to_string()],
        }
    }
}

/// `[output]`: bundle names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub css_bundle: String,
    pub js_bundle: String,
    pub source_map: SourceMapMode,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            css_bundle: "style.css".to_string(),
            js_bundle: "script.js".to_string(),
            source_map: SourceMapMode::default(),
        }
    }
}

/// `[tools]`: external transform commands.
///
/// Each command reads a source file on stdin and writes the result to
/// stdout. `{include}` in an argument is replaced by the stylesheet include
/// path.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub stylesheet_compiler: Vec<String>,
    /// Receives `[browsers]` as a browserslist query in `BROWSERSLIST`.
    pub autoprefixer: Vec<String>,
    pub js_minifier: Vec<String>,
    pub js_beautifier: Vec<String>,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            stylesheet_compiler: vec![
                "lessc".to_string(),
                "--include-path={include}".to_string(),
                "-".to_string(),
            ],
            autoprefixer: vec![
                "postcss".to_string(),
                "--use".to_string(),
                "autoprefixer".to_string(),
                "--no-map".to_string(),
            ],
            js_minifier: vec!["uglifyjs".to_string()],
            js_beautifier: vec!["js-beautify".to_string(), "-".to_string()],
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// Changes closer together than this are delivered as one batch.
    pub debounce_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self { debounce_ms: 50 }
    }
}

fn default_browsers() -> BTreeMap<String, String> {
    [
        ("chrome", "109"),
        ("edge", "109"),
        ("firefox", "115"),
        ("safari", "15.6"),
        ("ios_saf", "15.6"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
