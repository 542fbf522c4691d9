// src/dag/mod.rs

//! Dependency graph representation and pre-run validation.
//!
//! - [`graph`] holds the interned task graph: work plus upstream and
//!   downstream adjacency.
//! - [`validate`] checks, before anything is dispatched, that every task can
//!   eventually become eligible.

pub mod graph;
pub mod validate;

pub use graph::{DependencyGraph, TaskIndex, Work};
pub use validate::validate_graph;
