// src/pipeline/sourcemap.rs

//! Source maps (revision 3) at chunk granularity.
//!
//! Each generated line of a chunk gets one segment at the column where the
//! chunk's text starts on that line, pointing at column 0 of the matching
//! original line. For an untouched file that is an exact line mapping; for a
//! minified file all generated lines map to the start of the source.

use serde::Serialize;

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn to_json(&self) -> String {
        // Serializing plain strings and vectors cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    column: usize,
    /// `(source index, original line)`; `None` ends the previous mapping.
    origin: Option<(usize, usize)>,
}

/// Accumulates generated text positions and their original positions.
#[derive(Debug)]
pub struct SourceMapBuilder {
    sources: Vec<String>,
    contents: Vec<String>,
    lines: Vec<Vec<Segment>>,
    /// Generated column, in UTF-16 code units, where the next chunk starts.
    column: usize,
}

impl Default for SourceMapBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            contents: Vec::new(),
            lines: vec![Vec::new()],
            column: 0,
        }
    }
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source and return its index.
    ///
    /// Sources are keyed by name, so two files must never share one.
    pub fn add_source(&mut self, name: &str, content: &str) -> usize {
        if let Some(idx) = self.sources.iter().position(|s| s == name) {
            return idx;
        }
        self.sources.push(name.to_string());
        self.contents.push(content.to_string());
        self.sources.len() - 1
    }

    /// Append `generated`, the text of one chunk, directly after everything
    /// added so far. `source` is the chunk's registered source, if any, and
    /// `original_lines` the line count of its original text.
    pub fn add_chunk(&mut self, source: Option<usize>, generated: &str, original_lines: usize) {
        let last = original_lines.saturating_sub(1);

        for (i, piece) in generated.split('\n').enumerate() {
            if i > 0 {
                self.lines.push(Vec::new());
                self.column = 0;
            }
            if piece.is_empty() {
                continue;
            }
            let segment = Segment {
                column: self.column,
                origin: source.map(|idx| (idx, i.min(last))),
            };
            if let Some(line) = self.lines.last_mut() {
                line.push(segment);
            }
            self.column += piece.encode_utf16().count();
        }
    }

    pub fn build(self, file: &str) -> SourceMap {
        let mut mappings = String::new();
        let mut prev_source = 0i64;
        let mut prev_line = 0i64;

        for (i, segments) in self.lines.iter().enumerate() {
            if i > 0 {
                mappings.push(';');
            }
            let mut prev_column = 0i64;
            for (j, segment) in segments.iter().enumerate() {
                if j > 0 {
                    mappings.push(',');
                }
                let column = segment.column as i64;
                encode_vlq(&mut mappings, column - prev_column);
                prev_column = column;

                if let Some((source, orig_line)) = segment.origin {
                    let (source, orig_line) = (source as i64, orig_line as i64);
                    encode_vlq(&mut mappings, source - prev_source);
                    encode_vlq(&mut mappings, orig_line - prev_line);
                    encode_vlq(&mut mappings, 0);
                    prev_source = source;
                    prev_line = orig_line;
                }
            }
        }

        SourceMap {
            version: 3,
            file: file.to_string(),
            sources: self.sources,
            sources_content: self.contents,
            names: Vec::new(),
            mappings,
        }
    }
}

/// Number of lines as counted by a source map: a trailing newline opens one
/// more (empty) line.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (vlq & 0b1_1111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        out.push(BASE64_CHARS[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlq(value: i64) -> String {
        let mut s = String::new();
        encode_vlq(&mut s, value);
        s
    }

    #[test]
    fn vlq_matches_reference_values() {
        assert_eq!(vlq(0), "A");
        assert_eq!(vlq(1), "C");
        assert_eq!(vlq(-1), "D");
        assert_eq!(vlq(15), "e");
        assert_eq!(vlq(16), "gB");
        assert_eq!(vlq(-17), "jB");
    }

    #[test]
    fn two_sources_map_line_by_line() {
        let mut builder = SourceMapBuilder::new();
        let a = builder.add_source("a.js", "a1\na2\n");
        builder.add_chunk(Some(a), "a1\na2\n", 3);
        let b = builder.add_source("b.js", "b1");
        builder.add_chunk(Some(b), "b1", 1);

        let map = builder.build("bundle.js");
        assert_eq!(map.sources, vec!["a.js", "b.js"]);
        // line0 -> a:0, line1 -> a:1, line2 -> b:0
        assert_eq!(map.mappings, "AAAA;AACA;ACDA");
    }

    #[test]
    fn chunk_without_newline_continues_the_line() {
        let mut builder = SourceMapBuilder::new();
        let a = builder.add_source("a.js", "x");
        builder.add_chunk(Some(a), "x", 1);
        let b = builder.add_source("b.js", "yy\n");
        builder.add_chunk(Some(b), "yy\n", 2);
        builder.add_chunk(None, "zz", 0);

        let map = builder.build("bundle.js");
        // line0: col0 -> a:0, col1 -> b:0; line1: unmapped from col0
        assert_eq!(map.mappings, "AAAA,CCAA;A");
    }

    #[test]
    fn sources_with_the_same_name_are_shared() {
        let mut builder = SourceMapBuilder::new();
        let first = builder.add_source("js/a.js", "1");
        let second = builder.add_source("js/a.js", "2");
        let other = builder.add_source("lib/a.js", "3");
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let map = SourceMapBuilder::new().build("x.js");
        let json = map.to_json();
        assert!(json.contains("\"sourcesContent\":[]"));
        assert!(json.contains("\"version\":3"));
    }
}
