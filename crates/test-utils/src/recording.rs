use std::sync::{Arc, Mutex};

use assetpipe::errors::{Result, TransformError};
use assetpipe::pipeline::{SourceFile, Transform};

/// Pass-through stage that remembers the relative paths it saw, in order.
#[derive(Debug, Clone)]
pub struct RecordingTransform {
    name: String,
    seen: Arc<Mutex<Vec<String>>>,
    fail_on: Option<String>,
}

impl RecordingTransform {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            seen: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    /// Fail with a `TransformError` when this relative path comes through.
    pub fn failing_on(mut self, rel_path: &str) -> Self {
        self.fail_on = Some(rel_path.to_string());
        self
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transform for RecordingTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        let mut seen = self.seen.lock().unwrap();
        for file in &files {
            let rel = file.relative_str();
            if self.fail_on.as_deref() == Some(rel.as_str()) {
                return Err(
                    TransformError::new(&self.name, &file.path, "recording stage told to fail")
                        .into(),
                );
            }
            seen.push(rel);
        }
        Ok(files)
    }
}
