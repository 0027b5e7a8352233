// src/tasks/mod.rs

//! The fixed task set.
//!
//! Each build task is a [`TaskAction`]: an ordered source glob set plus a
//! pipeline assembled from the [`BuildContext`]. Tasks are wired into a graph
//! by [`standard_tasks`]; the `default` aggregate has no action of its own.

pub mod fonts;
pub mod scripts;
pub mod styles;
pub mod vendor;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::glob::SourceGlobs;
use crate::pipeline::{Pipeline, TransformRegistry};
use crate::types::BuildMode;

pub use fonts::FontsTask;
pub use scripts::ScriptsTask;
pub use styles::StylesTask;
pub use vendor::LessifyVendorTask;

pub const LESSIFY_VENDOR: &str = "lessify-vendor";
pub const STYLES: &str = "styles";
pub const SCRIPTS: &str = "scripts";
pub const FONTS: &str = "fonts";
pub const DEFAULT: &str = "default";

/// Everything a task needs to build its pipeline.
#[derive(Clone)]
pub struct BuildContext {
    pub fs: Arc<dyn FileSystem>,
    /// Project root; every configured path is relative to it.
    pub root: PathBuf,
    pub mode: BuildMode,
    pub config: Arc<ConfigFile>,
    pub transforms: Arc<TransformRegistry>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.root)
            .field("mode", &self.mode.label())
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        mode: BuildMode,
        config: ConfigFile,
        transforms: TransformRegistry,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            mode,
            config: Arc::new(config),
            transforms: Arc::new(transforms),
        }
    }

    /// Production context: real filesystem, tools from `[tools]`.
    pub fn from_config(config: ConfigFile, root: &Path, mode: BuildMode) -> Result<Self> {
        let transforms = TransformRegistry::from_config(&config, root)?;
        Ok(Self::new(
            Arc::new(RealFileSystem),
            root,
            mode,
            config,
            transforms,
        ))
    }

    /// `rel` under the project root.
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }
}

/// Summary of one successful task invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: String,
    pub inputs: usize,
    pub outputs: Vec<PathBuf>,
}

/// A build task: sources in, pipeline through, outputs written by the last
/// stage.
pub trait TaskAction: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn sources(&self, ctx: &BuildContext) -> Result<SourceGlobs>;

    fn pipeline(&self, ctx: &BuildContext) -> Pipeline;

    fn run(&self, ctx: &BuildContext) -> Result<TaskReport> {
        let inputs = self.sources(ctx)?.read(ctx.fs.as_ref(), &ctx.root)?;
        let input_count = inputs.len();
        let written = self.pipeline(ctx).run(inputs)?;

        let report = TaskReport {
            task: self.name().to_string(),
            inputs: input_count,
            outputs: written.into_iter().map(|f| f.path).collect(),
        };
        info!(
            task = %report.task,
            inputs = report.inputs,
            outputs = report.outputs.len(),
            "task pipeline finished"
        );
        Ok(report)
    }
}

/// A node of the task graph.
#[derive(Debug, Clone)]
pub struct TaskDef {
    pub name: String,
    /// Prerequisites that must succeed first.
    pub deps: Vec<String>,
    /// `None` for aggregates, which only group their prerequisites.
    pub action: Option<Arc<dyn TaskAction>>,
}

impl TaskDef {
    pub fn action(action: impl TaskAction + 'static, deps: &[&str]) -> Self {
        Self {
            name: action.name().to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            action: Some(Arc::new(action)),
        }
    }

    pub fn aggregate(name: &str, deps: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            action: None,
        }
    }
}

/// The registered tasks and their prerequisites.
pub fn standard_tasks() -> Vec<TaskDef> {
    vec![
        TaskDef::action(LessifyVendorTask, &[]),
        TaskDef::action(StylesTask, &[LESSIFY_VENDOR]),
        TaskDef::action(ScriptsTask, &[]),
        TaskDef::action(FontsTask, &[]),
        TaskDef::aggregate(DEFAULT, &[SCRIPTS, STYLES, FONTS]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_task_names_and_deps() {
        let tasks = standard_tasks();
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec![LESSIFY_VENDOR, STYLES, SCRIPTS, FONTS, DEFAULT]);

        let styles = tasks.iter().find(|t| t.name == STYLES).unwrap();
        assert_eq!(styles.deps, vec![LESSIFY_VENDOR]);

        let default = tasks.iter().find(|t| t.name == DEFAULT).unwrap();
        assert!(default.action.is_none());
        assert_eq!(default.deps, vec![SCRIPTS, STYLES, FONTS]);
    }
}
