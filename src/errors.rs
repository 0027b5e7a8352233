// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ConfigurationError`]: unknown task, unknown prerequisite, dependency
//!   cycle or invalid config value. Always raised before any task runs.
//! - [`TransformError`]: a transform failed on a specific source file.
//! - [`AssetpipeError`]: the umbrella type returned by the public API.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown task '{0}'")]
    UnknownTask(String),

    #[error("task '{task}' has unknown prerequisite '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("cycle detected in task graph involving task '{0}'")]
    DependencyCycle(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A transform failed while processing one source file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{transform} failed on {}: {message}", file.display())]
pub struct TransformError {
    pub transform: String,
    pub file: PathBuf,
    pub message: String,
}

impl TransformError {
    pub fn new(
        transform: impl Into<String>,
        file: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            transform: transform.into(),
            file: file.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AssetpipeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("build failed: {}", failed.join(", "))]
    BuildFailed { failed: Vec<String> },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssetpipeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssetpipeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetpipeError>;
