// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to built-in defaults (`loader.rs`).
//! - Validate globs, tool commands and browser targets (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, OutputSection, PathsSection, RawConfigFile, SourcesSection, ToolsSection,
    WatchSection,
};
pub use crate::types::BuildMode;
