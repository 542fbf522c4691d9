// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

/// A task body that returned an error or panicked.
///
/// Only the first failure of a run is kept; it is returned from the
/// `run` call that started the run.
#[derive(Error, Debug)]
#[error("task '{task}' failed: {source}")]
pub struct TaskFailure {
    pub task: String,
    #[source]
    pub source: anyhow::Error,
}

impl TaskFailure {
    pub fn new(task: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            task: task.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum RundagError {
    #[error("could not find a way to satisfy requirements of task '{task}'")]
    Unreachable { task: String },

    #[error("task '{task}' depends on unregistered task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("cycle detected in task graph involving task '{task}'")]
    Cycle { task: String },

    #[error(transparent)]
    TaskFailed(#[from] TaskFailure),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RundagError {
    /// Whether this error was raised by graph validation, before any work ran.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RundagError::Unreachable { .. }
                | RundagError::UnknownDependency { .. }
                | RundagError::Cycle { .. }
        )
    }

    /// The captured task failure, if this error came from a task body.
    pub fn as_task_failure(&self) -> Option<&TaskFailure> {
        match self {
            RundagError::TaskFailed(failure) => Some(failure),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RundagError>;
