// src/pipeline/transforms/dest.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{AssetpipeError, Result};
use crate::fs::FileSystem;
use crate::pipeline::{SourceFile, Transform};

/// Writes every file to `out_dir` joined with its path below the glob base.
///
/// The returned files point at their written locations.
#[derive(Debug, Clone)]
pub struct Dest {
    fs: Arc<dyn FileSystem>,
    out_dir: PathBuf,
}

impl Dest {
    pub fn new(fs: Arc<dyn FileSystem>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            out_dir: out_dir.into(),
        }
    }
}

impl Transform for Dest {
    fn name(&self) -> &str {
        "dest"
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        files
            .into_iter()
            .map(|mut file| {
                let target = self.out_dir.join(file.relative());
                self.fs
                    .write(&target, &file.contents)
                    .map_err(|e| AssetpipeError::io(&target, e))?;
                debug!(path = ?target, bytes = file.contents.len(), "wrote output");

                file.path = target;
                file.base = self.out_dir.clone();
                Ok(file)
            })
            .collect()
    }
}
