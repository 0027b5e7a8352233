// src/pipeline/transforms/mod.rs

//! Pipeline stages.
//!
//! Tool-backed stages ([`command`], [`css`]) are treated as opaque byte
//! transforms; the rest are the pipeline's own plumbing.

pub mod changed;
pub mod command;
pub mod concat;
pub mod css;
pub mod dest;
pub mod rename;
pub mod sourcemaps;

use rayon::prelude::*;

use crate::errors::Result;
use crate::pipeline::{SourceFile, Transform};

pub use changed::Changed;
pub use command::CommandTransform;
pub use concat::Concat;
pub use css::CssMinify;
pub use dest::Dest;
pub use rename::Rename;
pub use sourcemaps::{SourceMapInit, SourceMapWrite};

/// Stage that passes files through untouched under a given name.
#[derive(Debug, Clone)]
pub struct Identity {
    name: String,
}

impl Identity {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Transform for Identity {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        Ok(files)
    }
}

/// Apply `f` to every file in parallel. Output order equals input order.
pub(crate) fn map_each<F>(files: Vec<SourceFile>, f: F) -> Result<Vec<SourceFile>>
where
    F: Fn(SourceFile) -> Result<SourceFile> + Send + Sync,
{
    files.into_par_iter().map(f).collect()
}
