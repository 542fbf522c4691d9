// src/exec/mod.rs

//! Work execution layer.
//!
//! - [`backend`] provides the `WorkerPool` trait the dispatcher submits jobs
//!   to; tests can replace it with a deterministic implementation.
//! - [`tokio_pool`] contains `TokioWorkerPool`, the bounded production pool.

pub mod backend;
pub mod tokio_pool;

pub use backend::{Job, WorkerPool};
pub use tokio_pool::TokioWorkerPool;
