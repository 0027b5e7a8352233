// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_or_default;
use crate::dag::{RunReport, Scheduler, TaskGraph};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::{AssetpipeError, Result};
use crate::exec::RealExecutorBackend;
use crate::tasks::{BuildContext, standard_tasks};
use crate::types::BuildMode;
use crate::watch::WatchSubscription;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and build mode detection
/// - the task graph, scheduler and runtime
/// - the executor
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let root = config_root_dir(args.config.as_deref());
    let mode = BuildMode::from_env();
    let graph = TaskGraph::new(standard_tasks())?;

    if args.list {
        print_task_list(&graph);
        return Ok(());
    }

    let target = args.target().to_string();
    // Unknown targets fail before any task runs.
    let order = graph.resolve(&target)?;

    let ctx = BuildContext::from_config(cfg, &root, mode)?;
    info!(
        target = %target,
        mode = mode.label(),
        root = %root.display(),
        "assetpipe starting"
    );

    if args.dry_run {
        print_dry_run(&graph, &order, &ctx);
        return Ok(());
    }

    if args.watch_mode() {
        watch(ctx, graph, &target).await?;
        return Ok(());
    }

    let report = build_with_graph(ctx, graph, &target).await?;
    if !report.is_success() {
        return Err(AssetpipeError::BuildFailed {
            failed: report.failed_tasks(),
        }
        .into());
    }
    Ok(())
}

/// Run `target` and its prerequisites once against the standard task set.
pub async fn build(ctx: BuildContext, target: &str) -> Result<RunReport> {
    let graph = TaskGraph::new(standard_tasks())?;
    build_with_graph(ctx, graph, target).await
}

/// Run `target` once against an arbitrary task graph and return its report.
///
/// Task failures are reported in the returned [`RunReport`], not as `Err`.
pub async fn build_with_graph(
    ctx: BuildContext,
    graph: TaskGraph,
    target: &str,
) -> Result<RunReport> {
    graph.resolve(target)?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = RealExecutorBackend::new(rt_tx.clone(), ctx);
    spawn_ctrl_c(rt_tx.clone());

    rt_tx
        .send(RuntimeEvent::BuildRequested {
            targets: vec![target.to_string()],
            reason: TriggerReason::Manual,
        })
        .await
        .map_err(|e| anyhow!("runtime channel closed: {e}"))?;

    let core = CoreRuntime::new(
        Scheduler::new(graph),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let reports = Runtime::new(core, rt_rx, executor).run().await?;

    reports
        .into_iter()
        .last()
        .ok_or_else(|| anyhow!("build of '{target}' was interrupted").into())
}

/// Build `target`, then rebuild the default aggregate on every debounced
/// batch of source changes until Ctrl-C.
///
/// Failed runs are logged and watching continues.
async fn watch(ctx: BuildContext, graph: TaskGraph, target: &str) -> Result<()> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let subscription = WatchSubscription::from_config(&ctx.config)?;
    let debounce = Duration::from_millis(ctx.config.watch().debounce_ms);
    let _watcher_handle =
        crate::watch::spawn_watcher(ctx.root.clone(), subscription, debounce, rt_tx.clone())?;

    let executor = RealExecutorBackend::new(rt_tx.clone(), ctx);
    spawn_ctrl_c(rt_tx.clone());

    rt_tx
        .send(RuntimeEvent::BuildRequested {
            targets: vec![target.to_string()],
            reason: TriggerReason::Manual,
        })
        .await
        .map_err(|e| anyhow!("runtime channel closed: {e}"))?;

    let core = CoreRuntime::new(
        Scheduler::new(graph),
        RuntimeOptions {
            exit_when_idle: false,
        },
    );
    let reports = Runtime::new(core, rt_rx, executor).run().await?;
    info!(runs = reports.len(), "watch stopped");
    Ok(())
}

/// Ctrl-C becomes a graceful shutdown request.
fn spawn_ctrl_c(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "web/Assetpipe.toml"),
///   we use that directory.
/// - Otherwise (bare filename or no `--config`) we fall back to the current
///   working directory.
fn config_root_dir(config_path: Option<&Path>) -> PathBuf {
    match config_path.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_task_list(graph: &TaskGraph) {
    for name in graph.tasks() {
        let deps = graph.dependencies_of(name);
        if deps.is_empty() {
            println!("{name}");
        } else {
            println!("{name} <- {}", deps.join(", "));
        }
    }
}

/// Dry-run output: the resolved order and each task's stages.
fn print_dry_run(graph: &TaskGraph, order: &[String], ctx: &BuildContext) {
    println!("assetpipe dry-run ({} mode)", ctx.mode.label());
    println!("  root = {}", ctx.root.display());
    println!();

    for name in order {
        match graph.action_of(name) {
            Some(action) => {
                println!("  - {name}");
                let stages = action.pipeline(ctx).stage_names();
                println!("      stages: {}", stages.join(" -> "));
                match action.sources(ctx) {
                    Ok(globs) => {
                        let patterns: Vec<&str> =
                            globs.patterns().iter().map(|p| p.as_str()).collect();
                        println!("      sources: {}", patterns.join(", "));
                    }
                    Err(e) => println!("      sources: <invalid: {e}>"),
                }
            }
            None => println!("  - {name} (aggregate)"),
        }
    }

    debug!("dry-run complete (no execution)");
}
