// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::watch::event_handler::batch_request;
use crate::watch::patterns::WatchSubscription;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying debouncer (and its OS watcher) is
/// kept alive for as long as needed. Dropping this handle stops watching.
pub struct WatcherHandle {
    _inner: Debouncer<RecommendedWatcher>,
    dirs: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Directories registered with the OS watcher.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("dirs", &self.dirs)
            .finish_non_exhaustive()
    }
}

/// Spawn a debounced watcher over the subscription's directories.
///
/// Every debounced batch containing at least one watched path becomes one
/// `RuntimeEvent::BuildRequested` for the subscription's target. Must be
/// called from within a Tokio runtime.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    subscription: WatchSubscription,
    debounce: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or(root);

    // Channel from the debouncer thread into the async world.
    let (batch_tx, mut batch_rx) = mpsc::unbounded_channel::<Vec<PathBuf>>();

    let mut debouncer = new_debouncer(debounce, move |res: DebounceEventResult| match res {
        Ok(events) => {
            let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
            if batch_tx.send(paths).is_err() {
                debug!("watch batch receiver dropped");
            }
        }
        Err(err) => {
            warn!(error = %err, "file watch error");
        }
    })
    .context("creating file watcher")?;

    let dirs = subscription.watch_dirs(&root);
    for dir in &dirs {
        debouncer
            .watcher()
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("watching {}", dir.display()))?;
    }

    info!(
        ?dirs,
        debounce_ms = debounce.as_millis() as u64,
        target = subscription.target(),
        "file watcher started"
    );

    let async_root = root.clone();
    tokio::spawn(async move {
        while let Some(paths) = batch_rx.recv().await {
            if let Some(event) = batch_request(&async_root, &paths, &subscription) {
                if runtime_tx.send(event).await.is_err() {
                    debug!("runtime gone; stopping watcher loop");
                    break;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: debouncer,
        dirs,
    })
}
