// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - sending `ScheduledTask`s to the executor
//! - handling Ctrl+C / shutdown
//!
//! The core is unit tested without any Tokio, channels, filesystem, or
//! processes.

use crate::dag::Scheduler;
use crate::engine::event_handlers::{CoreStep, handle_build_request, handle_task_completion};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};

/// Pure core runtime state.
///
/// This owns:
/// - the scheduler
/// - the trigger queue
/// - runtime options (e.g. `exit_when_idle`)
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler, options: RuntimeOptions) -> Self {
        Self {
            scheduler,
            queue: TriggerQueue::new(),
            options,
        }
    }

    /// Expose whether the scheduler is idle (for tests).
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Expose queue emptiness (for tests).
    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::BuildRequested { targets, reason } => handle_build_request(
                &mut self.scheduler,
                &mut self.queue,
                &self.options,
                targets,
                reason,
            ),
            RuntimeEvent::TaskCompleted { task, outcome } => handle_task_completion(
                &mut self.scheduler,
                &mut self.queue,
                &self.options,
                task,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::TaskGraph;
    use crate::engine::{CoreCommand, TaskOutcome, TriggerReason};
    use crate::tasks::{self, standard_tasks};

    fn core(exit_when_idle: bool) -> CoreRuntime {
        let scheduler = Scheduler::new(TaskGraph::new(standard_tasks()).unwrap());
        CoreRuntime::new(scheduler, RuntimeOptions { exit_when_idle })
    }

    fn request(reason: TriggerReason) -> RuntimeEvent {
        RuntimeEvent::BuildRequested {
            targets: vec![tasks::DEFAULT.to_string()],
            reason,
        }
    }

    fn done(task: &str) -> RuntimeEvent {
        RuntimeEvent::TaskCompleted {
            task: task.to_string(),
            outcome: TaskOutcome::Success,
        }
    }

    fn dispatched(step: &CoreStep) -> Vec<String> {
        step.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::DispatchTasks(tasks) => Some(tasks),
                _ => None,
            })
            .flatten()
            .map(|t| t.name.clone())
            .collect()
    }

    fn finished_runs(step: &CoreStep) -> usize {
        step.commands
            .iter()
            .filter(|c| matches!(c, CoreCommand::RunFinished(_)))
            .count()
    }

    /// Complete a full default run, returning the final step.
    fn finish_default_run(core: &mut CoreRuntime) -> CoreStep {
        core.step(done(tasks::LESSIFY_VENDOR));
        core.step(done(tasks::SCRIPTS));
        core.step(done(tasks::FONTS));
        core.step(done(tasks::STYLES));
        core.step(done(tasks::DEFAULT))
    }

    #[test]
    fn one_shot_run_exits_when_idle() {
        let mut core = core(true);
        let step = core.step(request(TriggerReason::Manual));
        assert!(step.keep_running);
        assert_eq!(
            dispatched(&step),
            vec![tasks::LESSIFY_VENDOR, tasks::SCRIPTS, tasks::FONTS]
        );

        let last = finish_default_run(&mut core);
        assert_eq!(finished_runs(&last), 1);
        assert!(matches!(last.commands.last(), Some(CoreCommand::RequestExit)));
        assert!(!last.keep_running);
    }

    #[test]
    fn changes_during_run_cause_exactly_one_follow_up() {
        let mut core = core(false);
        core.step(request(TriggerReason::Manual));

        for _ in 0..5 {
            let step = core.step(request(TriggerReason::FileWatch));
            assert!(step.commands.is_empty());
        }
        assert!(!core.queue_is_empty());

        let end_of_first = finish_default_run(&mut core);
        assert_eq!(finished_runs(&end_of_first), 1);
        assert_eq!(
            dispatched(&end_of_first),
            vec![tasks::LESSIFY_VENDOR, tasks::SCRIPTS, tasks::FONTS]
        );
        assert!(core.queue_is_empty());
        assert_eq!(core.scheduler().current_run_id(), Some(2));

        let end_of_second = finish_default_run(&mut core);
        assert_eq!(finished_runs(&end_of_second), 1);
        assert!(dispatched(&end_of_second).is_empty());
        assert!(core.is_idle());
        assert!(end_of_second.keep_running);
    }

    #[test]
    fn debounced_batch_of_changes_runs_default_once() {
        use std::path::{Path, PathBuf};

        use crate::config::ConfigFile;
        use crate::watch::WatchSubscription;
        use crate::watch::event_handler::batch_request;

        let root = Path::new("/proj");
        let sub = WatchSubscription::from_config(&ConfigFile::default()).unwrap();
        let batch: Vec<PathBuf> = (0..8)
            .map(|i| root.join(format!("powerapp/project_static/js_src/m{i}.js")))
            .chain([root.join("powerapp/project_static/less/main.less")])
            .collect();

        let mut core = core(false);
        core.step(request(TriggerReason::Manual));
        finish_default_run(&mut core);
        assert!(core.is_idle());

        let event = batch_request(root, &batch, &sub).expect("batch matches");
        let step = core.step(event);
        assert_eq!(
            dispatched(&step),
            vec![tasks::LESSIFY_VENDOR, tasks::SCRIPTS, tasks::FONTS]
        );

        let end = finish_default_run(&mut core);
        assert_eq!(finished_runs(&end), 1);
        assert!(dispatched(&end).is_empty());
        assert!(core.queue_is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn failed_run_is_reported_and_watch_continues() {
        let mut core = core(false);
        core.step(request(TriggerReason::Manual));
        core.step(RuntimeEvent::TaskCompleted {
            task: tasks::SCRIPTS.to_string(),
            outcome: TaskOutcome::Failed("uglifyjs exited with 1".into()),
        });
        core.step(done(tasks::LESSIFY_VENDOR));
        core.step(done(tasks::FONTS));
        let last = core.step(done(tasks::STYLES));

        let report = last
            .commands
            .iter()
            .find_map(|c| match c {
                CoreCommand::RunFinished(r) => Some(r.clone()),
                _ => None,
            })
            .expect("run finished");
        assert_eq!(report.failed_tasks(), vec![tasks::SCRIPTS, tasks::DEFAULT]);
        assert!(last.keep_running);
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = core(false);
        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(!step.keep_running);
    }
}
