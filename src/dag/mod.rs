// src/dag/mod.rs

//! Task graph and scheduling.
//!
//! - [`graph`] holds the validated task graph and resolves a target's
//!   prerequisites in topological order.
//! - [`scheduler`] contains the per-run state machine that decides
//!   which tasks are ready to run, and when dependents can be scheduled.
//! - [`task_info`] provides task metadata and scheduled task types.
//! - [`scheduler_step`] defines the result types for scheduler steps and runs.
//! - [`state_manager`] manages per-run state transitions.

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use graph::TaskGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::{RunReport, SchedulerStep, TaskFailure};
pub use task_info::{ScheduledTask, TaskRunState};
