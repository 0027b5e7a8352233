// src/dag/task_info.rs

//! Task metadata and per-run state management.

use std::fmt;
use std::sync::Arc;

use crate::engine::TaskName;
use crate::tasks::TaskAction;

/// Per-run state of a task (internal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Task is part of this run but is waiting on prerequisites.
    Pending,
    /// Task has been dispatched to the executor and is currently running.
    Running,
    DoneSuccess,
    /// Task failed in this run (or was blocked by a failed prerequisite).
    DoneFailed,
}

/// Public, read-only view of a task's per-run state.
///
/// This is exposed for tests and diagnostics without leaking the internal
/// `RunState` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// The task is not currently participating in this run.
    NotInRun,
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
}

impl From<Option<RunState>> for TaskRunState {
    fn from(state: Option<RunState>) -> Self {
        match state {
            None => TaskRunState::NotInRun,
            Some(RunState::Pending) => TaskRunState::Pending,
            Some(RunState::Running) => TaskRunState::Running,
            Some(RunState::DoneSuccess) => TaskRunState::DoneSuccess,
            Some(RunState::DoneFailed) => TaskRunState::DoneFailed,
        }
    }
}

/// Static task information from the graph, plus per-run state.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    /// Direct prerequisites.
    pub deps: Vec<TaskName>,
    pub action: Option<Arc<dyn TaskAction>>,

    /// Per-run state (None if not participating in the current run).
    pub run_state: Option<RunState>,
    /// Why the task failed in the current run.
    pub failure: Option<String>,
    /// Position in the current run's completion order.
    pub finished_seq: Option<usize>,

    /// Last run ID in which this task succeeded.
    pub last_successful_run: Option<u64>,
    /// Last run ID in which this task failed.
    pub last_failed_run: Option<u64>,
}

impl TaskInfo {
    pub fn new(name: TaskName, deps: Vec<TaskName>, action: Option<Arc<dyn TaskAction>>) -> Self {
        Self {
            name,
            deps,
            action,
            run_state: None,
            failure: None,
            finished_seq: None,
            last_successful_run: None,
            last_failed_run: None,
        }
    }

    pub fn reset_for_run(&mut self) {
        self.run_state = None;
        self.failure = None;
        self.finished_seq = None;
    }
}

/// Description of a task that the scheduler wants the executor to run now.
#[derive(Clone)]
pub struct ScheduledTask {
    pub name: TaskName,
    /// `None` for aggregates, which complete as soon as they are dispatched.
    pub action: Option<Arc<dyn TaskAction>>,
    /// All tasks that belong to the same run share the same `run_id`.
    pub run_id: u64,
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("name", &self.name)
            .field("aggregate", &self.action.is_none())
            .field("run_id", &self.run_id)
            .finish()
    }
}

impl ScheduledTask {
    pub fn from_task_info(info: &TaskInfo, run_id: u64) -> Self {
        Self {
            name: info.name.clone(),
            action: info.action.clone(),
            run_id,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.action.is_none()
    }
}
