use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use assetpipe::config::{ConfigFile, RawConfigFile};
use assetpipe::dag::TaskGraph;
use assetpipe::errors::ConfigurationError;
use assetpipe::fs::mock::MockFileSystem;
use assetpipe::pipeline::TransformRegistry;
use assetpipe::tasks::{BuildContext, TaskDef};
use assetpipe::types::BuildMode;

pub const VENDOR_CSS_DIR: &str = "./node_modules/materialize-css/bin";
pub const VENDOR_FONT_DIR: &str = "./node_modules/materialize-css/font";
pub const STYLESHEET_DIR: &str = "./powerapp/project_static/less";
pub const LIBRARY_DIR: &str = "./powerapp/project_static/less/lib";
pub const SCRIPT_SRC_DIR: &str = "./powerapp/project_static/js_src";
pub const CSS_OUT: &str = "./powerapp/project_static/css";
pub const JS_OUT: &str = "./powerapp/project_static/js";
pub const FONT_OUT: &str = "./powerapp/project_static/font";

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    /// Starts from the built-in defaults.
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                browsers: ConfigFile::default().browsers().clone(),
                ..RawConfigFile::default()
            },
        }
    }

    pub fn with_scripts(mut self, patterns: &[&str]) -> Self {
        self.config.sources.scripts = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_stylesheets(mut self, patterns: &[&str]) -> Self {
        self.config.sources.stylesheets = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_browsers(mut self, browsers: &[(&str, &str)]) -> Self {
        self.config.browsers = browsers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>();
        self
    }

    /// Replace one `[tools]` command, e.g. `("autoprefixer", &["cat"])`.
    pub fn with_tool(mut self, tool: &str, argv: &[&str]) -> Self {
        let argv: Vec<String> = argv.iter().map(|a| a.to_string()).collect();
        let tools = &mut self.config.tools;
        match tool {
            "stylesheet_compiler" => tools.stylesheet_compiler = argv,
            "autoprefixer" => tools.autoprefixer = argv,
            "js_minifier" => tools.js_minifier = argv,
            "js_beautifier" => tools.js_beautifier = argv,
            other => panic!("unknown tool {other:?}"),
        }
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.config.watch.debounce_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeds a `MockFileSystem` with the default project layout, rooted at `"."`.
pub struct ProjectBuilder {
    fs: MockFileSystem,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(),
        }
    }

    pub fn file(self, path: &str, contents: &str) -> Self {
        self.fs.add_file(path, contents);
        self
    }

    pub fn vendor_css(self, name: &str, contents: &str) -> Self {
        self.fs.add_file(Path::new(VENDOR_CSS_DIR).join(name), contents);
        self
    }

    pub fn stylesheet(self, name: &str, contents: &str) -> Self {
        self.fs.add_file(Path::new(STYLESHEET_DIR).join(name), contents);
        self
    }

    pub fn script(self, name: &str, contents: &str) -> Self {
        self.fs.add_file(Path::new(SCRIPT_SRC_DIR).join(name), contents);
        self
    }

    /// `rel` is below the vendor font directory, e.g. `roboto/Roboto-Bold.woff`.
    pub fn font(self, rel: &str, contents: &[u8]) -> Self {
        self.fs.add_file(Path::new(VENDOR_FONT_DIR).join(rel), contents.to_vec());
        self
    }

    pub fn build(self) -> MockFileSystem {
        self.fs
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Context over `fs` rooted at `"."` where every opaque tool is an identity
/// stage.
pub fn mock_context(fs: &MockFileSystem, mode: BuildMode) -> BuildContext {
    mock_context_with(fs, mode, ConfigFile::default(), TransformRegistry::identity())
}

pub fn mock_context_with(
    fs: &MockFileSystem,
    mode: BuildMode,
    config: ConfigFile,
    transforms: TransformRegistry,
) -> BuildContext {
    BuildContext::new(Arc::new(fs.clone()), ".", mode, config, transforms)
}

/// Graph of action-less tasks from `(name, prerequisites)` pairs, in order.
pub fn aggregate_graph(
    edges: &[(String, Vec<String>)],
) -> Result<TaskGraph, ConfigurationError> {
    let defs = edges
        .iter()
        .map(|(name, deps)| {
            let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
            TaskDef::aggregate(name, &deps)
        })
        .collect();
    TaskGraph::new(defs)
}
