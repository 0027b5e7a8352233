// src/pipeline/transforms/changed.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::hash::{compute_bytes_hash, compute_file_hash};
use crate::pipeline::{SourceFile, Transform};

/// Incremental filter: keeps only files whose destination is missing or
/// differs in content.
///
/// The destination is `dest_dir` joined with the file's path below its glob
/// base, with the extension swapped to `extension` when one is given (the
/// name a later `Rename` stage will produce).
#[derive(Debug, Clone)]
pub struct Changed {
    fs: Arc<dyn FileSystem>,
    dest_dir: PathBuf,
    extension: Option<String>,
}

impl Changed {
    pub fn new(fs: Arc<dyn FileSystem>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dest_dir: dest_dir.into(),
            extension: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    fn destination(&self, file: &SourceFile) -> PathBuf {
        let mut dest = self.dest_dir.join(file.relative());
        if let Some(ext) = &self.extension {
            dest.set_extension(ext);
        }
        dest
    }

    fn is_changed(&self, file: &SourceFile, dest: &Path) -> Result<bool> {
        if !self.fs.is_file(dest) {
            return Ok(true);
        }
        let existing = compute_file_hash(self.fs.as_ref(), dest)?;
        Ok(existing != compute_bytes_hash(&file.contents))
    }
}

impl Transform for Changed {
    fn name(&self) -> &str {
        "changed"
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        let mut kept = Vec::with_capacity(files.len());
        for file in files {
            let dest = self.destination(&file);
            if self.is_changed(&file, &dest)? {
                kept.push(file);
            } else {
                debug!(file = ?file.path, dest = ?dest, "unchanged; skipping");
            }
        }
        Ok(kept)
    }
}
