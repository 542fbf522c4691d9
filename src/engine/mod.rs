// src/engine/mod.rs

//! Orchestration engine for rundag.
//!
//! This module ties together:
//! - the dependency graph and its validation
//! - the per-run shared state (completion synchronizer + failure sink)
//! - the dispatcher that submits tasks to a worker pool as they become
//!   eligible
//! - the observer hooks used for logging
//!
//! [`TaskExecutor`] is the entry point; everything else is plumbing for a
//! single call to [`TaskExecutor::run`].

mod dispatcher;
pub mod executor;
pub mod observer;
mod state;

pub use executor::{RunReport, TaskExecutor};
pub use observer::{NoopObserver, RunObserver, TracingObserver};
