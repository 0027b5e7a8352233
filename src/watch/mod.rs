// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Building the watch subscription from the configured source globs.
//! - Wiring up a debounced, cross-platform filesystem watcher
//!   (`notify` + `notify-debouncer-mini`).
//! - Turning each debounced batch into at most one build request.
//!
//! It does **not** know about the task graph; it only turns filesystem
//! changes into requests for the subscription's target.

pub mod event_handler;
pub mod patterns;
pub mod watcher;

pub use patterns::WatchSubscription;
pub use watcher::{WatcherHandle, spawn_watcher};
