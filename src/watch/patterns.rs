// src/watch/patterns.rs

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::ConfigFile;
use crate::engine::TaskName;
use crate::errors::ConfigurationError;
use crate::pipeline::glob::SourceGlobs;
use crate::tasks::DEFAULT;

/// What watch mode listens to and what it runs.
///
/// Built once when watch mode starts: the union of the script, stylesheet and
/// font glob sets, mapped to the `default` aggregate. Neither the vendor
/// stylesheets nor the output directories are watched, so a build never
/// re-triggers itself.
#[derive(Debug, Clone)]
pub struct WatchSubscription {
    target: TaskName,
    globs: SourceGlobs,
}

impl WatchSubscription {
    pub fn new(target: impl Into<TaskName>, globs: SourceGlobs) -> Self {
        Self {
            target: target.into(),
            globs,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Result<Self, ConfigurationError> {
        let sources = cfg.sources();
        let scripts = SourceGlobs::new(&sources.scripts)?;
        let stylesheets = SourceGlobs::new(&sources.stylesheets)?;
        let fonts = SourceGlobs::new(&sources.fonts)?;

        Ok(Self::new(
            DEFAULT,
            SourceGlobs::union([&scripts, &stylesheets, &fonts]),
        ))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// `rel_path` is relative to the project root, with forward slashes.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.globs.is_match(rel_path)
    }

    /// Directories to register with the OS watcher: the static bases of all
    /// patterns, minus those nested inside another base. A base that does not
    /// exist yet is replaced by its nearest existing ancestor (at worst
    /// `root`), so sources created there later still trigger a rebuild.
    pub fn watch_dirs(&self, root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .globs
            .patterns()
            .iter()
            .map(|p| existing_ancestor(root, p.base()))
            .collect();
        dirs.sort();
        dirs.dedup();

        let mut outermost: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            if outermost.iter().any(|d| dir.starts_with(d)) {
                continue;
            }
            outermost.push(dir);
        }
        outermost
    }
}

fn existing_ancestor(root: &Path, base: &Path) -> PathBuf {
    let mut rel = base;
    loop {
        let dir = if rel.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(rel)
        };
        if dir.is_dir() || rel.as_os_str().is_empty() {
            if rel != base {
                warn!(
                    base = %base.display(),
                    watching = %dir.display(),
                    "watch directory does not exist yet; watching its nearest existing ancestor"
                );
            }
            return dir;
        }
        rel = rel.parent().unwrap_or(Path::new(""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_subscription_covers_sources_but_not_outputs() {
        let sub = WatchSubscription::from_config(&ConfigFile::default()).unwrap();
        assert_eq!(sub.target(), DEFAULT);

        assert!(sub.matches("powerapp/project_static/js_src/app.js"));
        assert!(sub.matches("powerapp/project_static/less/main.less"));
        assert!(sub.matches("node_modules/materialize-css/font/roboto/Roboto-Bold.woff2"));
        assert!(sub.matches("node_modules/jquery/dist/jquery.js"));

        // Library copies and build outputs never trigger a rebuild.
        assert!(!sub.matches("powerapp/project_static/less/lib/materialize.less"));
        assert!(!sub.matches("powerapp/project_static/css/style.css"));
        assert!(!sub.matches("powerapp/project_static/js/script.js"));
        assert!(!sub.matches("node_modules/materialize-css/bin/materialize.css"));
    }

    #[test]
    fn nested_bases_collapse_and_missing_fall_back_to_root() {
        let sub = WatchSubscription::new(
            DEFAULT,
            SourceGlobs::new(&["a/*.js", "a/b/**/*", "c/*.less"]).unwrap(),
        );
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(sub.watch_dirs(dir.path()), vec![dir.path().to_path_buf()]);

        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::create_dir_all(dir.path().join("c")).unwrap();
        assert_eq!(
            sub.watch_dirs(dir.path()),
            vec![dir.path().join("a"), dir.path().join("c")]
        );
    }

    #[test]
    fn missing_base_is_covered_by_its_nearest_existing_ancestor() {
        let sub = WatchSubscription::new(
            DEFAULT,
            SourceGlobs::new(&["web/js/*.js", "web/less/*.less", "fonts/**/*"]).unwrap(),
        );
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("web/js")).unwrap();
        std::fs::create_dir_all(dir.path().join("fonts")).unwrap();

        // `web/less` is missing, so `web` is watched and covers `web/js` too.
        assert_eq!(
            sub.watch_dirs(dir.path()),
            vec![dir.path().join("fonts"), dir.path().join("web")]
        );

        std::fs::create_dir_all(dir.path().join("web/less")).unwrap();
        assert_eq!(
            sub.watch_dirs(dir.path()),
            vec![
                dir.path().join("fonts"),
                dir.path().join("web/js"),
                dir.path().join("web/less"),
            ]
        );
    }
}
