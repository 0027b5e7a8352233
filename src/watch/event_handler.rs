// src/watch/event_handler.rs

//! Turning debounced filesystem batches into build requests.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::pipeline::glob::relative_to_root;
use crate::watch::patterns::WatchSubscription;

/// Root-relative paths in `paths` that the subscription cares about, sorted
/// and deduplicated.
pub fn matching_changes(root: &Path, paths: &[PathBuf], sub: &WatchSubscription) -> Vec<String> {
    let mut changes: Vec<String> = paths
        .iter()
        .filter_map(|path| {
            let rel = relativize(root, path);
            if rel.is_none() {
                warn!(?path, ?root, "could not relativize path against root");
            }
            rel
        })
        .filter(|rel| sub.matches(rel))
        .collect();
    changes.sort();
    changes.dedup();
    changes
}

/// Root-relative form of an event path.
///
/// Event paths can carry a different absolute prefix than `root` (symlinked
/// temp dirs on macOS), so a failed prefix match is retried with the
/// canonical root and the canonical parent. The parent is used because the
/// file itself may already be gone.
fn relativize(root: &Path, path: &Path) -> Option<String> {
    if let Some(rel) = relative_to_root(root, path) {
        return Some(rel);
    }

    let root = root.canonicalize().ok()?;
    let parent = path.parent()?.canonicalize().ok()?;
    let name = path.file_name()?;
    relative_to_root(&root, &parent.join(name))
}

/// One build request for a whole debounced batch, or `None` when nothing in
/// the batch matches.
pub fn batch_request(
    root: &Path,
    paths: &[PathBuf],
    sub: &WatchSubscription,
) -> Option<RuntimeEvent> {
    let changes = matching_changes(root, paths, sub);
    if changes.is_empty() {
        debug!(events = paths.len(), "no watched paths in batch");
        return None;
    }

    debug!(?changes, target = sub.target(), "watched files changed");
    Some(RuntimeEvent::BuildRequested {
        targets: vec![sub.target().to_string()],
        reason: TriggerReason::FileWatch,
    })
}
