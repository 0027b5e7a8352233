// src/dag/scheduler.rs

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::scheduler_step::{RunReport, SchedulerStep, TaskFailure};
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{TaskName, TaskOutcome};

/// Scheduler holds the immutable task graph plus mutable per-run state.
///
/// It is responsible for:
/// - remembering which tasks are part of the current run
/// - deciding when a pending task is ready (prerequisites succeeded)
/// - marking tasks as succeeded or failed
/// - failing dependents when a task fails
/// - reporting the run once every participating task is terminal
#[derive(Debug)]
pub struct Scheduler {
    graph: TaskGraph,
    tasks: HashMap<TaskName, TaskInfo>,
    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,
    /// Completions seen in the current run, used to order the report.
    completion_seq: usize,
}

impl Scheduler {
    pub fn new(graph: TaskGraph) -> Self {
        let tasks = graph
            .tasks()
            .map(|name| {
                let info = TaskInfo::new(
                    name.to_string(),
                    graph.dependencies_of(name).to_vec(),
                    graph.action_of(name),
                );
                (name.to_string(), info)
            })
            .collect();

        Self {
            graph,
            tasks,
            run_counter: 0,
            current_run_id: None,
            completion_seq: 0,
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    pub fn current_run_id(&self) -> Option<u64> {
        self.current_run_id
    }

    /// Read-only view of the given task's run state.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        let info = self.tasks.get(task)?;
        Some(info.run_state.into())
    }

    /// Names of tasks participating in the active run.
    pub fn tasks_in_current_run(&self) -> Vec<TaskName> {
        if self.current_run_id.is_none() {
            return Vec::new();
        }

        self.graph
            .tasks()
            .filter(|name| {
                self.tasks
                    .get(*name)
                    .is_some_and(|info| info.run_state.is_some())
            })
            .map(str::to_string)
            .collect()
    }

    /// Whether the prerequisites of `task` are satisfied for the current run.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        let mgr = ReadOnlyStateManager::new(&self.tasks);
        Some(mgr.deps_satisfied_for_info(info))
    }

    /// Start a new run for `targets` and their transitive prerequisites.
    ///
    /// Returns the tasks that are immediately ready. If a run is already
    /// active the call is ignored and an empty step is returned; callers
    /// queue requests while running.
    pub fn start_run(&mut self, targets: &[TaskName]) -> SchedulerStep {
        if self.current_run_id.is_some() {
            warn!(?targets, "start_run called while a run is active; ignoring");
            return SchedulerStep::default();
        }

        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);
        self.completion_seq = 0;
        for info in self.tasks.values_mut() {
            info.reset_for_run();
        }
        info!(run_id = self.run_counter, ?targets, "starting run");

        let mut manager = StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
        for target in targets {
            manager.mark_target_and_prerequisites_pending(target);
        }
        let newly_scheduled = manager.collect_new_ready_tasks();
        let finished_run = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            newly_failed: Vec::new(),
            finished_run,
        }
    }

    /// Handle completion of a task with a concrete outcome (production API).
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    /// Completion variant returning the rich [`SchedulerStep`].
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let run_id = match self.current_run_id {
            Some(id) => id,
            None => {
                warn!(task = %task, "completion with no active run; ignoring");
                return SchedulerStep::default();
            }
        };

        let mut newly_scheduled = Vec::new();
        let mut newly_failed = Vec::new();

        match self.tasks.get_mut(task) {
            Some(info) if info.run_state != Some(RunState::Running) => {
                warn!(
                    task = %info.name,
                    state = ?info.run_state,
                    "completion for task that is not running; ignoring"
                );
            }
            Some(info) => {
                self.completion_seq += 1;
                info.finished_seq = Some(self.completion_seq);

                match outcome {
                    TaskOutcome::Success => {
                        info.run_state = Some(RunState::DoneSuccess);
                        info.last_successful_run = Some(run_id);
                        debug!(task = %info.name, run_id, "task completed successfully");
                        let mut manager =
                            StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
                        newly_scheduled.extend(manager.collect_new_ready_tasks());
                    }
                    TaskOutcome::Failed(reason) => {
                        info.run_state = Some(RunState::DoneFailed);
                        info.last_failed_run = Some(run_id);
                        warn!(
                            task = %info.name,
                            run_id,
                            error = %reason,
                            "task failed; failing dependents in this run"
                        );
                        info.failure = Some(reason);
                        newly_failed.push(info.name.clone());
                        let mut manager =
                            StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
                        newly_failed.append(&mut manager.mark_dependents_failed(task));
                    }
                }
            }
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
            }
        }

        let finished_run = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            newly_failed,
            finished_run,
        }
    }

    /// Names of all registered tasks, for listing and dry-run output.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.tasks()
    }

    /// Close the current run if every participating task is terminal.
    fn maybe_finish_run(&mut self) -> Option<RunReport> {
        let run_id = self.current_run_id?;

        let manager = StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
        if !manager.all_tasks_terminal() {
            return None;
        }

        let mut succeeded: Vec<(usize, TaskName)> = Vec::new();
        let mut failed = Vec::new();
        for name in self.graph.tasks() {
            let Some(info) = self.tasks.get(name) else {
                continue;
            };
            match info.run_state {
                Some(RunState::DoneSuccess) => {
                    succeeded.push((info.finished_seq.unwrap_or(usize::MAX), info.name.clone()))
                }
                Some(RunState::DoneFailed) => failed.push(TaskFailure {
                    task: info.name.clone(),
                    reason: info.failure.clone().unwrap_or_default(),
                }),
                _ => {}
            }
        }
        succeeded.sort();

        let report = RunReport {
            run_id,
            succeeded: succeeded.into_iter().map(|(_, name)| name).collect(),
            failed,
        };

        info!(
            run_id,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "run finished"
        );
        self.current_run_id = None;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{self, TaskDef, standard_tasks};

    fn scheduler() -> Scheduler {
        Scheduler::new(TaskGraph::new(standard_tasks()).unwrap())
    }

    fn names(tasks: &[ScheduledTask]) -> Vec<&str> {
        tasks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn default_run_schedules_roots_first() {
        let mut s = scheduler();
        let step = s.start_run(&[tasks::DEFAULT.to_string()]);
        assert_eq!(
            names(&step.newly_scheduled),
            vec![tasks::LESSIFY_VENDOR, tasks::SCRIPTS, tasks::FONTS]
        );
        assert_eq!(s.run_state_of(tasks::STYLES), Some(TaskRunState::Pending));
        assert_eq!(s.deps_satisfied(tasks::STYLES), Some(false));
    }

    #[test]
    fn styles_waits_for_vendor_copy() {
        let mut s = scheduler();
        s.start_run(&[tasks::STYLES.to_string()]);
        assert_eq!(s.tasks_in_current_run(), vec![tasks::LESSIFY_VENDOR, tasks::STYLES]);

        let ready = s.handle_completion(tasks::LESSIFY_VENDOR, TaskOutcome::Success);
        assert_eq!(names(&ready), vec![tasks::STYLES]);

        let step = s.step_completion(tasks::STYLES, TaskOutcome::Success);
        let report = step.finished_run.expect("run finished");
        assert!(report.is_success());
        assert_eq!(report.succeeded, vec![tasks::LESSIFY_VENDOR, tasks::STYLES]);
        assert!(s.is_idle());
    }

    #[test]
    fn failure_blocks_dependents_but_not_siblings() {
        let mut s = scheduler();
        s.start_run(&[tasks::DEFAULT.to_string()]);

        let step = s.step_completion(
            tasks::LESSIFY_VENDOR,
            TaskOutcome::Failed("permission denied".into()),
        );
        assert_eq!(
            step.newly_failed,
            vec![tasks::LESSIFY_VENDOR, tasks::STYLES, tasks::DEFAULT]
        );
        assert!(step.finished_run.is_none());

        s.handle_completion(tasks::SCRIPTS, TaskOutcome::Success);
        let report = s
            .step_completion(tasks::FONTS, TaskOutcome::Success)
            .finished_run
            .expect("run finished");

        assert_eq!(report.succeeded, vec![tasks::SCRIPTS, tasks::FONTS]);
        assert_eq!(
            report.failed_tasks(),
            vec![tasks::LESSIFY_VENDOR, tasks::STYLES, tasks::DEFAULT]
        );
        assert_eq!(report.failed[1].reason, "prerequisite 'lessify-vendor' failed");
    }

    #[test]
    fn aggregate_only_graph_runs_to_completion() {
        let graph = TaskGraph::new(vec![TaskDef::aggregate("a", &[])]).unwrap();
        let mut s = Scheduler::new(graph);
        let step = s.start_run(&["a".to_string()]);
        assert!(step.newly_scheduled[0].is_aggregate());
        let report = s.step_completion("a", TaskOutcome::Success).finished_run.unwrap();
        assert_eq!(report.run_id, 1);
    }

    #[test]
    fn second_run_gets_new_id() {
        let mut s = scheduler();
        s.start_run(&[tasks::FONTS.to_string()]);
        s.handle_completion(tasks::FONTS, TaskOutcome::Success);
        s.start_run(&[tasks::FONTS.to_string()]);
        assert_eq!(s.current_run_id(), Some(2));
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut s = scheduler();
        s.start_run(&[tasks::FONTS.to_string()]);
        let step = s.step_completion(tasks::SCRIPTS, TaskOutcome::Success);
        assert!(step.newly_scheduled.is_empty());
        assert!(step.finished_run.is_none());
        assert!(!s.is_idle());
    }
}
