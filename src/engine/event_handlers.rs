// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, info};

use crate::dag::{RunReport, ScheduledTask, Scheduler, SchedulerStep};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TaskName, TaskOutcome, TriggerReason};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// A run completed; the shell records and reports it.
    RunFinished(RunReport),
    /// Request that the process exits (one-shot builds, once idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

/// Handle a build request.
///
/// - If the scheduler is idle, start a new run for these targets plus
///   anything already queued.
/// - If a run is active, queue the targets. All requests made during one run
///   collapse into a single follow-up run.
pub fn handle_build_request(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    targets: Vec<TaskName>,
    reason: TriggerReason,
) -> CoreStep {
    if !scheduler.is_idle() {
        for target in &targets {
            queue.record(target, reason);
        }
        return CoreStep {
            commands: Vec::new(),
            keep_running: true,
        };
    }

    debug!(?targets, ?reason, "scheduler idle; starting run");
    let mut all_targets = queue.drain_pending();
    for target in targets {
        if !all_targets.contains(&target) {
            all_targets.push(target);
        }
    }

    let mut commands = start_new_run_from_targets(scheduler, all_targets);
    let keep_running = push_exit_if_done(scheduler, queue, options, &mut commands);

    CoreStep {
        commands,
        keep_running,
    }
}

/// Handle a task completion event.
pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskName,
    outcome: TaskOutcome,
) -> CoreStep {
    let step = scheduler.step_completion(&task, outcome);
    let mut commands = commands_for_step(step);

    if scheduler.is_idle() && !queue.is_empty() {
        let triggers = queue.drain_pending();
        info!(?triggers, "starting queued follow-up run");
        commands.extend(start_new_run_from_targets(scheduler, triggers));
    }

    let keep_running = push_exit_if_done(scheduler, queue, options, &mut commands);

    CoreStep {
        commands,
        keep_running,
    }
}

/// Seed a new run from root targets and translate the first step into
/// commands.
pub fn start_new_run_from_targets(
    scheduler: &mut Scheduler,
    targets: Vec<TaskName>,
) -> Vec<CoreCommand> {
    if targets.is_empty() {
        return Vec::new();
    }
    commands_for_step(scheduler.start_run(&targets))
}

fn commands_for_step(step: SchedulerStep) -> Vec<CoreCommand> {
    let mut commands = Vec::new();
    if !step.newly_scheduled.is_empty() {
        commands.push(CoreCommand::DispatchTasks(step.newly_scheduled));
    }
    if let Some(report) = step.finished_run {
        commands.push(CoreCommand::RunFinished(report));
    }
    commands
}

/// In one-shot mode, exit once the scheduler is idle with nothing queued.
/// Returns the `keep_running` flag.
fn push_exit_if_done(
    scheduler: &Scheduler,
    queue: &TriggerQueue,
    options: &RuntimeOptions,
    commands: &mut Vec<CoreCommand>,
) -> bool {
    if options.exit_when_idle && scheduler.is_idle() && queue.is_empty() {
        commands.push(CoreCommand::RequestExit);
        false
    } else {
        true
    }
}
