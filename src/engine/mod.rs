// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the task scheduler
//! - the trigger queue (what happens when build requests arrive while a run
//!   is active)
//! - the main runtime event loop that reacts to:
//!   - manual and file-watch build requests
//!   - task completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of a task for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// The task's error, rendered for the run report.
    Failed(String),
}

/// Why a build was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Requested from the command line at startup.
    Manual,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once the scheduler is idle and nothing is
    /// queued (one-shot builds).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the CLI, the watcher and the
/// executor.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Run `targets` (and their prerequisites).
    BuildRequested {
        targets: Vec<TaskName>,
        reason: TriggerReason,
    },
    /// A task finished with a concrete outcome.
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
