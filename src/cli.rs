// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Task name that switches to watch mode instead of naming a task.
pub const WATCH_TASK: &str = "watch";

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Build stylesheets, scripts and fonts for the project's static assets.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run. `watch` is shorthand for `--watch`.
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Run the task, then rebuild the default set whenever sources change.
    #[arg(long)]
    pub watch: bool,

    /// Path to the config file (TOML).
    ///
    /// Default: `Assetpipe.toml` in the current working directory, or the
    /// built-in defaults when that file does not exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved task order and pipeline stages without building.
    #[arg(long)]
    pub dry_run: bool,

    /// List registered tasks and exit.
    #[arg(long)]
    pub list: bool,
}

impl CliArgs {
    /// Whether watch mode was requested, by flag or by task name.
    pub fn watch_mode(&self) -> bool {
        self.watch || self.task == WATCH_TASK
    }

    /// The task to build first. `watch` maps to the default aggregate.
    pub fn target(&self) -> &str {
        if self.task == WATCH_TASK {
            crate::tasks::DEFAULT
        } else {
            &self.task
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_default_task() {
        let args = CliArgs::try_parse_from(["assetpipe"]).unwrap();
        assert_eq!(args.target(), "default");
        assert!(!args.watch_mode());
        assert!(args.config.is_none());
    }

    #[test]
    fn watch_task_is_watch_mode_on_default() {
        let args = CliArgs::try_parse_from(["assetpipe", "watch"]).unwrap();
        assert!(args.watch_mode());
        assert_eq!(args.target(), "default");
    }

    #[test]
    fn flags_parse() {
        let args = CliArgs::try_parse_from([
            "assetpipe",
            "styles",
            "--watch",
            "--config",
            "conf/Assetpipe.toml",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.target(), "styles");
        assert!(args.watch_mode());
        assert!(args.dry_run);
        assert_eq!(args.config, Some(PathBuf::from("conf/Assetpipe.toml")));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
