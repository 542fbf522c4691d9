// src/config/mod.rs

//! Executor configuration.
//!
//! - [`model`] defines the TOML-backed data model and the validated
//!   [`ExecutorConfig`] the rest of the crate consumes.
//! - [`loader`] reads a config file from disk.
//! - [`validate`] turns a [`RawConfigFile`] into an [`ExecutorConfig`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ExecutorConfig, ExecutorSection, LoggingSection, RawConfigFile};
