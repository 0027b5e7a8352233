// src/dag/state_manager.rs

//! Per-run state management for tasks in the scheduler.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::TaskGraph;
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo};
use crate::engine::TaskName;

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    graph: &'a TaskGraph,
    tasks: &'a mut HashMap<TaskName, TaskInfo>,
    current_run_id: Option<u64>,
}

impl<'a> StateManager<'a> {
    pub fn new(
        graph: &'a TaskGraph,
        tasks: &'a mut HashMap<TaskName, TaskInfo>,
        current_run_id: Option<u64>,
    ) -> Self {
        Self {
            graph,
            tasks,
            current_run_id,
        }
    }

    /// Include a requested target and all its transitive prerequisites in
    /// this run.
    ///
    /// Tasks already participating keep their current state, so requesting
    /// two targets that share a prerequisite runs it once.
    pub fn mark_target_and_prerequisites_pending(&mut self, target: &str) {
        let closure = match self.graph.resolve(target) {
            Ok(order) => order,
            Err(err) => {
                warn!(task = %target, error = %err, "cannot add target to run");
                return;
            }
        };

        for name in closure {
            if let Some(info) = self.tasks.get_mut(&name) {
                if info.run_state.is_none() {
                    info.run_state = Some(RunState::Pending);
                    debug!(task = %info.name, "marked Pending for this run");
                }
            }
        }
    }

    /// Determine whether all prerequisites of the given task are satisfied for
    /// the *current run*.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        let ro = ReadOnlyStateManager::new(self.tasks);
        ro.deps_satisfied_for_info(info)
    }

    /// Mark all participating dependents (transitively) of a failed task as
    /// `DoneFailed` for this run.
    ///
    /// Returns the tasks newly marked as failed, excluding `failed_task`.
    pub fn mark_dependents_failed(&mut self, failed_task: &str) -> Vec<TaskName> {
        let mut stack: Vec<(TaskName, TaskName)> = self
            .graph
            .dependents_of(failed_task)
            .iter()
            .map(|d| (d.clone(), failed_task.to_string()))
            .collect();

        let mut newly_failed = Vec::new();

        while let Some((name, upstream)) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&name) {
                match info.run_state {
                    Some(RunState::Pending) | Some(RunState::Running) => {
                        info.run_state = Some(RunState::DoneFailed);
                        info.failure = Some(format!("prerequisite '{upstream}' failed"));
                        if let Some(run_id) = self.current_run_id {
                            info.last_failed_run = Some(run_id);
                        }
                        debug!(
                            task = %info.name,
                            upstream = %upstream,
                            "marking dependent as DoneFailed due to upstream failure"
                        );
                        newly_failed.push(info.name.clone());
                        stack.extend(
                            self.graph
                                .dependents_of(&name)
                                .iter()
                                .map(|d| (d.clone(), name.clone())),
                        );
                    }
                    Some(RunState::DoneSuccess) | Some(RunState::DoneFailed) | None => {
                        // Either already terminal or not participating in this run.
                    }
                }
            }
        }

        newly_failed
    }

    /// Collect tasks that are `Pending` and whose prerequisites are satisfied,
    /// mark them as `Running`, and return them as `ScheduledTask`s.
    ///
    /// The result follows graph registration order.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        let mut ready = Vec::new();

        // Decide first, then mutate to avoid borrowing issues.
        let candidates: Vec<TaskName> = self
            .graph
            .tasks()
            .filter(|name| {
                self.tasks.get(*name).is_some_and(|info| {
                    matches!(info.run_state, Some(RunState::Pending))
                        && self.deps_satisfied_for_info(info)
                })
            })
            .map(str::to_string)
            .collect();

        for name in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                let is_rerun = info.last_successful_run.is_some() || info.last_failed_run.is_some();

                if info.action.is_some() {
                    if is_rerun {
                        info!(task = %info.name, run_id = self.current_run_id, "re-running task");
                    } else {
                        info!(task = %info.name, run_id = self.current_run_id, "starting task");
                    }
                }

                debug!(
                    task = %info.name,
                    run_id = self.current_run_id,
                    "prerequisites satisfied; marking Running"
                );

                info.run_state = Some(RunState::Running);
                ready.push(ScheduledTask::from_task_info(
                    info,
                    self.current_run_id.unwrap_or(0),
                ));
            }
        }

        ready
    }

    /// Check if all tasks are in a terminal state.
    pub fn all_tasks_terminal(&self) -> bool {
        !self.tasks.values().any(|info| {
            matches!(
                info.run_state,
                Some(RunState::Pending) | Some(RunState::Running)
            )
        })
    }
}

/// A read-only view of the state manager for checking dependency satisfaction.
///
/// This is used when we only have shared access to the tasks map (e.g. in `Scheduler::deps_satisfied`).
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a HashMap<TaskName, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a HashMap<TaskName, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// A prerequisite is satisfied once it has succeeded in this run. Every
    /// prerequisite of a participating task participates too, so history is
    /// never consulted.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep_name| match self.tasks.get(dep_name) {
            Some(dep) => matches!(dep.run_state, Some(RunState::DoneSuccess)),
            None => {
                warn!(
                    task = %info.name,
                    dep = %dep_name,
                    "dependency missing from tasks map"
                );
                false
            }
        })
    }
}
