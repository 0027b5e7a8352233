// src/exec/executor_loop.rs

//! Main executor loop that hands scheduled tasks to task runners.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::exec::task_runner::run_task;
use crate::tasks::BuildContext;

/// Spawn the background executor loop.
///
/// The returned `mpsc::Sender<ScheduledTask>` is what
/// `RealExecutorBackend` forwards to. Each scheduled task runs in its own
/// Tokio task, so independent tasks of one run proceed concurrently. The
/// scheduler never dispatches a task twice within a run and never starts a
/// run while another is active, so no per-task bookkeeping is needed here.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    ctx: BuildContext,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!(mode = ctx.mode.label(), root = ?ctx.root, "executor loop started");

        while let Some(task) = rx.recv().await {
            let rt_tx = runtime_tx.clone();
            let task_ctx = ctx.clone();
            let name = task.name.clone();

            tokio::spawn(async move {
                run_task(task, task_ctx, rt_tx).await;
                debug!(task = %name, "task runner future finished");
            });
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
