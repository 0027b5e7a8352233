// src/pipeline/mod.rs

//! Transform pipelines.
//!
//! A task reads its sources through an ordered [`glob::SourceGlobs`] set,
//! then pushes the resulting `Vec<SourceFile>` through a [`Pipeline`]: an
//! ordered list of [`Transform`] stages applied one after the other.
//!
//! - [`glob`] expands ordered glob sets into source files.
//! - [`transforms`] holds the individual stages (compilers, minifiers,
//!   concatenation, source maps, incremental filter, rename, dest).
//! - [`registry`] bundles the opaque, tool-backed stages so tests can swap
//!   them for identity transforms.
//! - [`hash`] provides content hashing for the incremental copy.

pub mod glob;
pub mod hash;
pub mod registry;
pub mod sourcemap;
pub mod transforms;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::pipeline::sourcemap::SourceMap;

pub use registry::TransformRegistry;

/// Original contents of a file, captured by `SourceMapInit` before any
/// rewriting stage runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Name recorded in the source map's `sources` list.
    pub source: String,
    pub content: String,
}

/// One file flowing through a pipeline.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the file. For files read from disk this is the real path
    /// (project root joined with the matched relative path).
    pub path: PathBuf,
    /// Static prefix of the glob that matched this file. Output locations are
    /// computed from `path` relative to `base`.
    pub base: PathBuf,
    pub contents: Vec<u8>,
    pub origin: Option<Origin>,
    pub sourcemap: Option<SourceMap>,
}

impl SourceFile {
    pub fn new(base: impl Into<PathBuf>, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
            contents: contents.into(),
            origin: None,
            sourcemap: None,
        }
    }

    /// Path below the glob base, e.g. `a/b.woff` for `font/a/b.woff`
    /// matched by `font/**/*`.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    /// Forward-slash form of [`SourceFile::relative`].
    pub fn relative_str(&self) -> String {
        self.relative().to_string_lossy().replace('\\', "/")
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("base", &self.base)
            .field("len", &self.contents.len())
            .field("origin", &self.origin.as_ref().map(|o| &o.source))
            .field("sourcemap", &self.sourcemap.is_some())
            .finish()
    }
}

/// A single pipeline stage: a pure function from a list of files to a list
/// of files.
///
/// Stages may drop files (incremental filter), merge them (concatenation),
/// add files (external source maps) or rewrite contents.
pub trait Transform: Send + Sync {
    /// Stable stage name, used in logs and dry-run output.
    fn name(&self) -> &str;

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>>;
}

impl<T: Transform + ?Sized> Transform for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        (**self).apply(files)
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        (**self).apply(files)
    }
}

/// Ordered composition of transforms.
///
/// Conditional stages are resolved while the pipeline is assembled: a stage
/// whose condition is false is never added, so it does not show up in
/// [`Pipeline::stage_names`] and never sees a file.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Transform>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipe<T: Transform + 'static>(mut self, stage: T) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Add `stage` only when `condition` holds.
    pub fn pipe_if<T: Transform + 'static>(self, condition: bool, stage: T) -> Self {
        if condition { self.pipe(stage) } else { self }
    }

    /// Add exactly one of two stages.
    pub fn pipe_either<A, B>(self, condition: bool, if_true: A, if_false: B) -> Self
    where
        A: Transform + 'static,
        B: Transform + 'static,
    {
        if condition {
            self.pipe(if_true)
        } else {
            self.pipe(if_false)
        }
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Push `files` through every stage in order. The first failing stage
    /// aborts the pipeline.
    pub fn run(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        let mut files = files;
        for stage in &self.stages {
            let before = files.len();
            files = stage.apply(files)?;
            debug!(
                stage = stage.name(),
                files_in = before,
                files_out = files.len(),
                "pipeline stage finished"
            );
        }
        Ok(files)
    }
}
