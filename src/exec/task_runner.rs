// src/exec/task_runner.rs

//! Individual task runner.

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::tasks::BuildContext;

/// Run a single scheduled task and emit its `TaskCompleted` event.
///
/// Aggregates complete immediately. Build tasks run their pipeline on the
/// blocking pool; a panic inside the pipeline counts as a failure.
pub async fn run_task(task: ScheduledTask, ctx: BuildContext, runtime_tx: mpsc::Sender<RuntimeEvent>) {
    let outcome = execute(&task, ctx).await;

    if runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.name.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        warn!(
            task = %task.name,
            run_id = task.run_id,
            "runtime gone; dropping TaskCompleted event"
        );
    }
}

async fn execute(task: &ScheduledTask, ctx: BuildContext) -> TaskOutcome {
    let Some(action) = task.action.clone() else {
        return TaskOutcome::Success;
    };

    let started = Instant::now();
    let joined = tokio::task::spawn_blocking(move || action.run(&ctx)).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match joined {
        Ok(Ok(report)) => {
            info!(
                task = %task.name,
                run_id = task.run_id,
                outputs = report.outputs.len(),
                elapsed_ms,
                "task finished"
            );
            TaskOutcome::Success
        }
        Ok(Err(err)) => {
            error!(
                task = %task.name,
                run_id = task.run_id,
                error = %err,
                elapsed_ms,
                "task failed"
            );
            TaskOutcome::Failed(err.to_string())
        }
        Err(join_err) => {
            error!(
                task = %task.name,
                run_id = task.run_id,
                error = %join_err,
                "task pipeline panicked"
            );
            TaskOutcome::Failed(format!("task panicked: {join_err}"))
        }
    }
}
