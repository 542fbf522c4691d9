// src/exec/tokio_pool.rs

//! Bounded worker pool backed by Tokio's blocking thread pool.
//!
//! Task bodies are synchronous, so they are executed with `spawn_blocking`.
//! When the pool owns its runtime, `max_blocking_threads` caps how many bodies
//! run at the same time; extra jobs queue inside Tokio.

use anyhow::{Context, anyhow};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::config::ExecutorConfig;
use crate::errors::Result;
use crate::exec::backend::{Job, WorkerPool};

pub struct TokioWorkerPool {
    /// `None` when wrapping a runtime owned by somebody else.
    runtime: Option<Runtime>,
    handle: Handle,
    workers: Option<usize>,
}

impl TokioWorkerPool {
    /// Create a pool with its own runtime and at most `workers` concurrent jobs.
    pub fn new(workers: usize) -> Result<Self> {
        Self::build(workers, "rundag-worker")
    }

    /// Create a pool sized and named from `[executor]` config.
    pub fn from_config(config: &ExecutorConfig) -> Result<Self> {
        Self::build(config.workers, &config.thread_name)
    }

    /// Submit onto an existing runtime. Concurrency is then bounded by that
    /// runtime's own blocking-pool limit.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            runtime: None,
            handle,
            workers: None,
        }
    }

    fn build(workers: usize, thread_name: &str) -> Result<Self> {
        if workers == 0 {
            return Err(anyhow!("worker pool needs at least one worker").into());
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name(thread_name)
            .build()
            .context("building worker pool runtime")?;

        debug!(workers, thread_name, "worker pool started");

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            workers: Some(workers),
        })
    }
}

impl WorkerPool for TokioWorkerPool {
    fn submit(&self, job: Job) -> Result<()> {
        // The JoinHandle is dropped on purpose: completion is reported by the
        // job itself, and a detached blocking task keeps running.
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }

    fn capacity(&self) -> Option<usize> {
        self.workers
    }
}

impl Drop for TokioWorkerPool {
    fn drop(&mut self) {
        // Jobs still running after an aborted run are detached, not joined.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for TokioWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioWorkerPool")
            .field("owns_runtime", &self.runtime.is_some())
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}
