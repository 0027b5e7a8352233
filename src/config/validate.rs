// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::ConfigurationError;
use crate::pipeline::glob::GlobPattern;
use crate::pipeline::transforms::css::parse_browsers;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ConfigurationError;

    fn try_from(raw: RawConfigFile) -> Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<(), ConfigurationError> {
    validate_sources(cfg)?;
    validate_paths(cfg)?;
    validate_tools(cfg)?;
    validate_output(cfg)?;

    parse_browsers(&cfg.browsers)?;

    if cfg.watch.debounce_ms == 0 {
        return Err(invalid("[watch].debounce_ms must be >= 1 (got 0)"));
    }

    Ok(())
}

fn validate_sources(cfg: &RawConfigFile) -> Result<(), ConfigurationError> {
    let sets = [
        ("scripts", &cfg.sources.scripts),
        ("stylesheets", &cfg.sources.stylesheets),
        ("fonts", &cfg.sources.fonts),
    ];

    for (name, set) in sets {
        if set.is_empty() {
            return Err(invalid(format!("[sources].{name} must not be empty")));
        }
    }

    // The vendor set may legitimately be empty; its patterns still have to compile.
    for pattern in sets
        .iter()
        .flat_map(|(_, set)| set.iter())
        .chain(cfg.sources.vendor_stylesheets.iter())
    {
        GlobPattern::new(pattern)?;
    }

    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<(), ConfigurationError> {
    let ext = &cfg.paths.stylesheet_extension;
    if ext.is_empty() || ext.contains('.') || ext.contains('/') {
        return Err(invalid(format!(
            "[paths].stylesheet_extension must be a bare extension like \"less\" (got {ext:?})"
        )));
    }
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<(), ConfigurationError> {
    let tools = [
        ("stylesheet_compiler", &cfg.tools.stylesheet_compiler),
        ("autoprefixer", &cfg.tools.autoprefixer),
        ("js_minifier", &cfg.tools.js_minifier),
        ("js_beautifier", &cfg.tools.js_beautifier),
    ];
    for (name, cmd) in tools {
        if cmd.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(invalid(format!("[tools].{name} must name a program")));
        }
    }
    Ok(())
}

fn validate_output(cfg: &RawConfigFile) -> Result<(), ConfigurationError> {
    for (name, value) in [
        ("css_bundle", &cfg.output.css_bundle),
        ("js_bundle", &cfg.output.js_bundle),
    ] {
        if value.is_empty() || value.contains('/') || value.contains('\\') {
            return Err(invalid(format!(
                "[output].{name} must be a plain file name (got {value:?})"
            )));
        }
    }
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ConfigurationError {
    ConfigurationError::Invalid(msg.into())
}
