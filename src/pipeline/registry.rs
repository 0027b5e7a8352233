// src/pipeline/registry.rs

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::ConfigFile;
use crate::errors::ConfigurationError;
use crate::pipeline::Transform;
use crate::pipeline::transforms::css::{browserslist_query, parse_browsers};
use crate::pipeline::transforms::{CommandTransform, CssMinify, Identity};

pub const STYLESHEET_COMPILE: &str = "stylesheet-compile";
pub const MINIFY_CSS: &str = "minify-css";
pub const AUTOPREFIX: &str = "autoprefix";
pub const MINIFY_JS: &str = "minify-js";
pub const BEAUTIFY_JS: &str = "beautify-js";

/// The opaque, content-rewriting stages used by the build tasks.
///
/// Tasks never construct these themselves; they take them from the registry,
/// which lets tests substitute identity or recording transforms.
#[derive(Clone)]
pub struct TransformRegistry {
    pub stylesheet_compile: Arc<dyn Transform>,
    pub css_minify: Arc<dyn Transform>,
    pub autoprefix: Arc<dyn Transform>,
    pub js_minify: Arc<dyn Transform>,
    pub js_beautify: Arc<dyn Transform>,
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("stylesheet_compile", &self.stylesheet_compile.name())
            .field("css_minify", &self.css_minify.name())
            .field("autoprefix", &self.autoprefix.name())
            .field("js_minify", &self.js_minify.name())
            .field("js_beautify", &self.js_beautify.name())
            .finish()
    }
}

impl TransformRegistry {
    /// Real transforms: external tools from `[tools]`, lightningcss for CSS
    /// minification.
    ///
    /// `{include}` in the stylesheet compiler command expands to the
    /// stylesheet source directory under `root`. The autoprefixer gets the
    /// `[browsers]` table through `BROWSERSLIST`.
    pub fn from_config(cfg: &ConfigFile, root: &Path) -> Result<Self, ConfigurationError> {
        let tools = cfg.tools();
        let include = root.join(&cfg.paths().stylesheet_dir);
        let include = include.to_string_lossy();
        let browsers = parse_browsers(cfg.browsers())?;

        Ok(Self {
            stylesheet_compile: Arc::new(CommandTransform::from_argv(
                STYLESHEET_COMPILE,
                &tools.stylesheet_compiler,
                &[("include", include.as_ref())],
            )),
            css_minify: Arc::new(CssMinify::new(browsers)),
            autoprefix: Arc::new(
                CommandTransform::from_argv(AUTOPREFIX, &tools.autoprefixer, &[])
                    .with_env("BROWSERSLIST", browserslist_query(cfg.browsers())),
            ),
            js_minify: Arc::new(CommandTransform::from_argv(MINIFY_JS, &tools.js_minifier, &[])),
            js_beautify: Arc::new(CommandTransform::from_argv(
                BEAUTIFY_JS,
                &tools.js_beautifier,
                &[],
            )),
        })
    }

    /// Every stage passes files through unchanged, keeping the real names.
    pub fn identity() -> Self {
        Self {
            stylesheet_compile: Arc::new(Identity::named(STYLESHEET_COMPILE)),
            css_minify: Arc::new(Identity::named(MINIFY_CSS)),
            autoprefix: Arc::new(Identity::named(AUTOPREFIX)),
            js_minify: Arc::new(Identity::named(MINIFY_JS)),
            js_beautify: Arc::new(Identity::named(BEAUTIFY_JS)),
        }
    }
}
