// src/pipeline/glob.rs

//! Ordered glob sets.
//!
//! Patterns are evaluated against paths relative to the project root, with
//! forward slashes, and `*` never crosses a `/` (use `**` for that). Each
//! pattern has a *base*: its leading components without glob syntax. The
//! base is where directory walking starts and what output paths are made
//! relative to.
//!
//! Expansion order: patterns in declaration order; matches of a single
//! pattern sorted by path; a file matched by several patterns keeps its
//! first position.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::{AssetpipeError, ConfigurationError, Result};
use crate::fs::FileSystem;
use crate::pipeline::SourceFile;

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// A single compiled pattern.
#[derive(Clone)]
pub struct GlobPattern {
    raw: String,
    base: PathBuf,
    /// Max directory depth below `base` that can match; `None` with `**`.
    max_depth: Option<usize>,
    matcher: GlobMatcher,
}

impl fmt::Debug for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobPattern")
            .field("raw", &self.raw)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl GlobPattern {
    pub fn new(pattern: &str) -> std::result::Result<Self, ConfigurationError> {
        let pattern = pattern.trim_start_matches("./");
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                ConfigurationError::Invalid(format!("invalid glob pattern {pattern:?}: {e}"))
            })?;

        let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
        let first_magic = components
            .iter()
            .position(|c| c.contains(GLOB_META))
            // A literal path's base is its parent directory.
            .unwrap_or(components.len().saturating_sub(1));

        let base: PathBuf = components[..first_magic].iter().collect();
        let tail = &components[first_magic..];
        let max_depth = if tail.iter().any(|c| c.contains("**")) {
            None
        } else {
            Some(tail.len())
        };

        Ok(Self {
            raw: pattern.to_string(),
            base,
            max_depth,
            matcher: glob.compile_matcher(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Static directory prefix, relative to the project root.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Match a root-relative, forward-slash path.
    pub fn is_match(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }

    /// All files under `root` matching this pattern, sorted.
    pub fn matching_files(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        let base_dir = join_root(root, &self.base);
        if !fs.is_dir(&base_dir) {
            debug!(pattern = %self.raw, base = ?base_dir, "glob base missing; no matches");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut stack = vec![(base_dir, 0usize)];

        while let Some((dir, depth)) = stack.pop() {
            let entries = fs
                .read_dir(&dir)
                .map_err(|e| AssetpipeError::io(&dir, e))?;
            for path in entries {
                if fs.is_dir(&path) {
                    if self.max_depth.is_none_or(|max| depth + 1 < max) {
                        stack.push((path, depth + 1));
                    }
                } else if fs.is_file(&path) {
                    if let Some(rel) = relative_to_root(root, &path) {
                        if self.matcher.is_match(&rel) {
                            files.push(path);
                        }
                    }
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

/// Ordered list of patterns defining a task's inputs.
#[derive(Debug, Clone)]
pub struct SourceGlobs {
    patterns: Vec<GlobPattern>,
}

impl SourceGlobs {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> std::result::Result<Self, ConfigurationError> {
        let patterns = patterns
            .iter()
            .map(|p| GlobPattern::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[GlobPattern] {
        &self.patterns
    }

    /// Concatenate several sets, keeping order.
    pub fn union<'a>(sets: impl IntoIterator<Item = &'a SourceGlobs>) -> Self {
        Self {
            patterns: sets
                .into_iter()
                .flat_map(|s| s.patterns.iter().cloned())
                .collect(),
        }
    }

    /// True if any pattern matches the root-relative path.
    pub fn is_match(&self, rel_path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(rel_path))
    }

    /// Matched paths with the base of the pattern that matched them, in
    /// expansion order.
    pub fn expand(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut out = Vec::new();

        for pattern in &self.patterns {
            let base = join_root(root, pattern.base());
            for path in pattern.matching_files(fs, root)? {
                if seen.insert(path.clone()) {
                    out.push((base.clone(), path));
                }
            }
        }

        Ok(out)
    }

    /// Expand and read every matched file.
    pub fn read(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<SourceFile>> {
        self.expand(fs, root)?
            .into_iter()
            .map(|(base, path)| {
                let contents = fs.read(&path).map_err(|e| AssetpipeError::io(&path, e))?;
                Ok(SourceFile::new(base, path, contents))
            })
            .collect()
    }
}

fn join_root(root: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

/// Root-relative, forward-slash form of `path`.
pub fn relative_to_root(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn base_is_static_prefix() {
        let p = GlobPattern::new("node_modules/materialize-css/font/**/*").unwrap();
        assert_eq!(p.base(), Path::new("node_modules/materialize-css/font"));

        let p = GlobPattern::new("node_modules/jquery/dist/jquery.js").unwrap();
        assert_eq!(p.base(), Path::new("node_modules/jquery/dist"));

        let p = GlobPattern::new("*.css").unwrap();
        assert_eq!(p.base(), Path::new(""));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let p = GlobPattern::new("less/*.less").unwrap();
        assert!(p.is_match("less/main.less"));
        assert!(!p.is_match("less/lib/materialize.less"));
    }

    #[test]
    fn expansion_keeps_pattern_order_and_dedupes() {
        let fs = MockFileSystem::new();
        fs.add_file("./js/b.js", "b");
        fs.add_file("./js/a.js", "a");
        fs.add_file("./vendor/z.js", "z");

        let globs = SourceGlobs::new(&["vendor/z.js", "js/b.js", "js/*.js"]).unwrap();
        let files = globs.read(&fs, Path::new(".")).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.relative_str()).collect();
        assert_eq!(names, vec!["z.js", "b.js", "a.js"]);
    }

    #[test]
    fn missing_base_yields_nothing() {
        let fs = MockFileSystem::new();
        let globs = SourceGlobs::new(&["nowhere/*.css"]).unwrap();
        assert!(globs.read(&fs, Path::new(".")).unwrap().is_empty());
    }

    #[test]
    fn recursive_pattern_keeps_relative_structure() {
        let fs = MockFileSystem::new();
        fs.add_file("./font/a/b.woff", "woff");
        fs.add_file("./font/top.ttf", "ttf");

        let globs = SourceGlobs::new(&["font/**/*"]).unwrap();
        let files = globs.read(&fs, Path::new(".")).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.relative_str()).collect();
        assert_eq!(names, vec!["a/b.woff", "top.ttf"]);
    }
}
