// src/exec/backend.rs

//! Pluggable worker pool abstraction.
//!
//! The dispatcher talks to a `WorkerPool` instead of owning threads itself.
//! This makes it easy to swap in a deterministic pool in tests while keeping
//! the production pool in [`tokio_pool`](super::tokio_pool).

use crate::errors::Result;

/// A unit of work handed to a pool. It already contains the task body plus
/// the bookkeeping that runs after it.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Trait abstracting how submitted jobs are executed.
///
/// Contract: `submit` returns quickly and the job eventually runs, possibly
/// concurrently with other submitted jobs, on a thread the caller does not
/// control. An `Err` means the job will never run; the dispatcher turns it
/// into a failure of the task being submitted.
pub trait WorkerPool: Send + Sync {
    fn submit(&self, job: Job) -> Result<()>;

    /// Maximum number of jobs running at once, if bounded.
    fn capacity(&self) -> Option<usize> {
        None
    }
}
