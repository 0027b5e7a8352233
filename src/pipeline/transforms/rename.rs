// src/pipeline/transforms/rename.rs

use crate::errors::Result;
use crate::pipeline::{SourceFile, Transform};

/// Swaps the extension of every file, e.g. `materialize.css` ->
/// `materialize.less`. Contents are untouched.
#[derive(Debug, Clone)]
pub struct Rename {
    extension: String,
}

impl Rename {
    pub fn extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl Transform for Rename {
    fn name(&self) -> &str {
        "rename"
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        Ok(files
            .into_iter()
            .map(|mut file| {
                file.path.set_extension(&self.extension);
                file
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn replaces_extension_and_keeps_base() {
        let out = Rename::extension("less")
            .apply(vec![SourceFile::new("vendor", "vendor/sub/materialize.css", "x")])
            .unwrap();
        assert_eq!(out[0].relative(), Path::new("sub/materialize.less"));
        assert_eq!(out[0].contents, b"x");
    }
}
