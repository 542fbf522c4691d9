// src/lib.rs

//! In-process executor for tasks with dependencies.
//!
//! Register units of work together with the ids of the tasks they depend
//! on, then [`TaskExecutor::run`] them: a task is submitted to the worker pool
//! only once every dependency has completed, independent tasks run in
//! parallel, and the first task failure is returned from `run`.
//!
//! - [`dag`]: dependency graph and pre-run validation.
//! - [`engine`]: executor, dispatcher, per-run state, observer hooks.
//! - [`exec`]: worker pool trait and the Tokio-backed pool.
//! - [`config`]: `ExecutorConfig` and TOML loading.
//! - [`logging`]: `tracing-subscriber` setup.

pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

pub use crate::config::ExecutorConfig;
pub use crate::dag::{DependencyGraph, TaskIndex, Work};
pub use crate::engine::{NoopObserver, RunObserver, RunReport, TaskExecutor, TracingObserver};
pub use crate::errors::{Result, RundagError, TaskFailure};
pub use crate::exec::{Job, TokioWorkerPool, WorkerPool};
pub use crate::types::{LogLevel, TaskKey};
