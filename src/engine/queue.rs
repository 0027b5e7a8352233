// src/engine/queue.rs

use std::collections::BTreeSet;

use tracing::debug;

use super::{TaskName, TriggerReason};

/// Build requests that arrive while a run is already executing.
///
/// Semantics:
/// - Every request recorded during a run is merged into one pending batch,
///   so any number of changes during a run yields at most one follow-up run.
/// - When the runtime is idle and wants to start a new run, it calls
///   `drain_pending()`, which returns the batch's targets (sorted) and
///   empties the queue.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    pending: BTreeSet<TaskName>,
    /// Requests merged into the pending batch, for diagnostics.
    coalesced: usize,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no queued requests.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of requests folded into the pending batch.
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    /// Record that `target` was requested while a run is in progress.
    pub fn record(&mut self, target: &str, reason: TriggerReason) {
        let inserted = self.pending.insert(target.to_string());
        self.coalesced += 1;
        debug!(
            task = %target,
            ?reason,
            inserted,
            coalesced = self.coalesced,
            "queued build request for the next run"
        );
    }

    /// Take all pending targets, leaving the queue empty.
    pub fn drain_pending(&mut self) -> Vec<TaskName> {
        self.coalesced = 0;
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_requests_collapse_into_one_batch() {
        let mut q = TriggerQueue::new();
        assert!(q.is_empty());

        for _ in 0..5 {
            q.record("default", TriggerReason::FileWatch);
        }
        q.record("styles", TriggerReason::Manual);

        assert_eq!(q.coalesced(), 6);
        assert_eq!(q.drain_pending(), vec!["default", "styles"]);
        assert!(q.is_empty());
        assert_eq!(q.coalesced(), 0);
    }
}
