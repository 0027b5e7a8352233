// src/pipeline/transforms/sourcemaps.rs

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::Result;
use crate::pipeline::glob::relative_to_root;
use crate::pipeline::{Origin, SourceFile, Transform};
use crate::types::SourceMapMode;

/// Records each file's current contents as its source map origin.
///
/// Sources are named by their path relative to `root`, so files with the
/// same name in different directories stay distinct.
#[derive(Debug, Clone, Default)]
pub struct SourceMapInit {
    root: PathBuf,
}

impl SourceMapInit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Transform for SourceMapInit {
    fn name(&self) -> &str {
        "sourcemap-init"
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        Ok(files
            .into_iter()
            .map(|mut file| {
                file.origin = Some(Origin {
                    source: relative_to_root(&self.root, &file.path)
                        .unwrap_or_else(|| file.relative_str()),
                    content: String::from_utf8_lossy(&file.contents).into_owned(),
                });
                file
            })
            .collect())
    }
}

/// Emits the maps attached by earlier stages.
///
/// `File` adds a `<name>.map` sibling and a `sourceMappingURL` comment
/// pointing at it; `Inline` embeds the map as a base64 data URL.
#[derive(Debug, Clone, Default)]
pub struct SourceMapWrite {
    mode: SourceMapMode,
}

impl SourceMapWrite {
    pub fn new(mode: SourceMapMode) -> Self {
        Self { mode }
    }
}

impl Transform for SourceMapWrite {
    fn name(&self) -> &str {
        "sourcemap-write"
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        let mut out = Vec::with_capacity(files.len());

        for mut file in files {
            let Some(map) = file.sourcemap.take() else {
                out.push(file);
                continue;
            };
            let json = map.to_json();

            if !file.contents.is_empty() && !file.contents.ends_with(b"\n") {
                file.contents.push(b'\n');
            }

            match self.mode {
                SourceMapMode::File => {
                    let file_name = file
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| map.file.clone());
                    let map_name = format!("{file_name}.map");
                    file.contents
                        .extend_from_slice(format!("//# sourceMappingURL={map_name}\n").as_bytes());

                    let map_path = file.path.with_file_name(&map_name);
                    let map_file = SourceFile::new(file.base.clone(), map_path, json);
                    out.push(file);
                    out.push(map_file);
                }
                SourceMapMode::Inline => {
                    let encoded = STANDARD.encode(json.as_bytes());
                    file.contents.extend_from_slice(
                        format!(
                            "//# sourceMappingURL=data:application/json;charset=utf-8;base64,{encoded}\n"
                        )
                        .as_bytes(),
                    );
                    out.push(file);
                }
            }
        }

        Ok(out)
    }
}
