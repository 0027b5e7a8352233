// src/pipeline/transforms/concat.rs

use std::path::PathBuf;

use tracing::debug;

use crate::errors::Result;
use crate::pipeline::sourcemap::{SourceMapBuilder, line_count};
use crate::pipeline::{SourceFile, Transform};

/// Joins all files, in input order, into a single file named `file_name`.
///
/// The output is the plain byte concatenation of the inputs; no separator is
/// inserted. When any input carries an [`Origin`], the output gets a source
/// map covering every chunk.
///
/// [`Origin`]: crate::pipeline::Origin
#[derive(Debug, Clone)]
pub struct Concat {
    file_name: String,
}

impl Concat {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Transform for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn apply(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
        if files.is_empty() {
            debug!(file = %self.file_name, "nothing to concatenate");
            return Ok(Vec::new());
        }

        let wants_map = files.iter().any(|f| f.origin.is_some());
        let mut builder = SourceMapBuilder::new();
        let mut out: Vec<u8> = Vec::with_capacity(files.iter().map(|f| f.contents.len()).sum());

        for file in &files {
            out.extend_from_slice(&file.contents);

            if wants_map {
                let generated = String::from_utf8_lossy(&file.contents);
                match &file.origin {
                    Some(origin) => {
                        let idx = builder.add_source(&origin.source, &origin.content);
                        builder.add_chunk(Some(idx), &generated, line_count(&origin.content));
                    }
                    None => builder.add_chunk(None, &generated, 0),
                }
            }
        }

        let mut bundle = SourceFile::new(PathBuf::new(), PathBuf::from(&self.file_name), out);
        if wants_map {
            bundle.sourcemap = Some(builder.build(&self.file_name));
        }
        Ok(vec![bundle])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Origin;

    #[test]
    fn output_is_plain_byte_concatenation() {
        let out = Concat::new("script.js")
            .apply(vec![
                SourceFile::new("", "a.js", "A"),
                SourceFile::new("", "lib.js", "L\n"),
                SourceFile::new("", "app.js", "P"),
            ])
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, PathBuf::from("script.js"));
        assert_eq!(out[0].contents, b"AL\nP");
        assert!(out[0].sourcemap.is_none());
    }

    #[test]
    fn empty_input_produces_no_bundle() {
        assert!(Concat::new("style.css").apply(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn origins_produce_line_mapping() {
        let mut a = SourceFile::new("", "a.js", "a1\na2\n");
        a.origin = Some(Origin {
            source: "a.js".into(),
            content: "a1\na2\n".into(),
        });
        let mut b = SourceFile::new("", "b.js", "b1");
        b.origin = Some(Origin {
            source: "b.js".into(),
            content: "b1".into(),
        });

        let out = Concat::new("script.js").apply(vec![a, b]).unwrap();
        let map = out[0].sourcemap.as_ref().unwrap();
        assert_eq!(map.file, "script.js");
        assert_eq!(map.sources, vec!["a.js", "b.js"]);
        assert_eq!(map.mappings, "AAAA;AACA;ACDA");
    }

    #[test]
    fn mapping_follows_chunks_that_share_a_line() {
        let mut a = SourceFile::new("", "a.js", "a();");
        a.origin = Some(Origin {
            source: "a.js".into(),
            content: "a();".into(),
        });
        let mut b = SourceFile::new("", "b.js", "b();\n");
        b.origin = Some(Origin {
            source: "b.js".into(),
            content: "b();\n".into(),
        });

        let out = Concat::new("script.js").apply(vec![a, b]).unwrap();
        assert_eq!(out[0].contents, b"a();b();\n");
        // b starts at column 4 of the first line.
        assert_eq!(out[0].sourcemap.as_ref().unwrap().mappings, "AAAA,ICAA;");
    }
}
