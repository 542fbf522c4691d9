// src/engine/observer.rs

//! Lifecycle observation.
//!
//! The executor reports registration, scheduling, completion and failure
//! through a [`RunObserver`]. Observers are purely observational: nothing they
//! do feeds back into scheduling. The default is [`TracingObserver`], which
//! turns every hook into a structured `tracing` event.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::types::TaskKey;

/// Hooks invoked by the executor. All methods default to no-ops.
///
/// `started`, `completed` and `failed` are called on worker threads; the
/// others on the thread that called `register` / `run`. `completed` for a
/// task is always called before any of its dependents are submitted, and
/// before `run_finished` of the run it belongs to.
pub trait RunObserver<T>: Send + Sync {
    fn registered(&self, _task: &T, _depends_on: &[T]) {}

    fn run_started(&self, _pending: usize, _validated: bool) {}

    fn roots_discovered(&self, _roots: &[T]) {}

    fn scheduled(&self, _task: &T) {}

    /// `task` was re-evaluated but `waiting_on` has not completed yet.
    fn deferred(&self, _task: &T, _waiting_on: &T) {}

    fn started(&self, _task: &T) {}

    fn completed(&self, _task: &T) {}

    /// `first` is false for failures that arrive after the run already failed;
    /// those are reported here and then dropped.
    fn failed(&self, _task: &T, _error: &anyhow::Error, _first: bool) {}

    fn run_finished(&self, _completed: usize, _failed: bool, _elapsed: Duration) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<T> RunObserver<T> for NoopObserver {}

/// Default observer: logs every hook through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<T: TaskKey> RunObserver<T> for TracingObserver {
    fn registered(&self, task: &T, depends_on: &[T]) {
        info!(task = %task, depends_on = ?depends_on, "registering task");
    }

    fn run_started(&self, pending: usize, validated: bool) {
        info!(pending, validated, "starting run");
    }

    fn roots_discovered(&self, roots: &[T]) {
        info!(roots = ?roots, "starting tasks");
    }

    fn scheduled(&self, task: &T) {
        info!(task = %task, "scheduling task");
    }

    fn deferred(&self, task: &T, waiting_on: &T) {
        debug!(
            task = %task,
            waiting_on = %waiting_on,
            "not scheduling yet; dependency has not completed"
        );
    }

    fn started(&self, task: &T) {
        let thread = std::thread::current();
        debug!(
            task = %task,
            thread = thread.name().unwrap_or("<unnamed>"),
            "task executing"
        );
    }

    fn completed(&self, task: &T) {
        info!(task = %task, "task completed");
    }

    fn failed(&self, task: &T, error: &anyhow::Error, first: bool) {
        if first {
            error!(task = %task, error = %error, "task failed; aborting run");
        } else {
            warn!(
                task = %task,
                error = %error,
                "task failed after run already failed; discarding"
            );
        }
    }

    fn run_finished(&self, completed: usize, failed: bool, elapsed: Duration) {
        if failed {
            info!(completed, ?elapsed, "run aborted by task failure");
        } else {
            info!(completed, ?elapsed, "run finished");
        }
    }
}
