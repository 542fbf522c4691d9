use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use rundag::errors::Result;
use rundag::exec::{Job, WorkerPool};

/// A pool that runs every job immediately on the submitting thread.
///
/// Makes runs fully deterministic: roots run in registration order and each
/// completion runs its newly eligible dependents before returning.
#[derive(Debug, Default)]
pub struct InlinePool {
    submitted: AtomicUsize,
}

impl InlinePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs submitted so far.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }
}

impl WorkerPool for InlinePool {
    fn submit(&self, job: Job) -> Result<()> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        job();
        Ok(())
    }

    fn capacity(&self) -> Option<usize> {
        Some(1)
    }
}

/// A pool that runs the first `accept` jobs inline and rejects the rest.
#[derive(Debug)]
pub struct RejectingPool {
    accept: usize,
    seen: AtomicUsize,
}

impl RejectingPool {
    pub fn after(accept: usize) -> Self {
        Self {
            accept,
            seen: AtomicUsize::new(0),
        }
    }
}

impl WorkerPool for RejectingPool {
    fn submit(&self, job: Job) -> Result<()> {
        let n = self.seen.fetch_add(1, Ordering::SeqCst);
        if n >= self.accept {
            return Err(anyhow!("pool is shut down").into());
        }
        job();
        Ok(())
    }
}

/// A pool that accepts every job and drops it without running it.
#[derive(Debug, Default)]
pub struct DroppingPool;

impl WorkerPool for DroppingPool {
    fn submit(&self, job: Job) -> Result<()> {
        drop(job);
        Ok(())
    }
}
