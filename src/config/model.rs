// src/config/model.rs

use serde::Deserialize;

use crate::types::LogLevel;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [executor]
/// workers = 8
/// validate = true
/// strict_validation = true
/// thread_name = "rundag-worker"
///
/// [logging]
/// level = "debug"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub executor: ExecutorSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[executor]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorSection {
    /// Upper bound on task bodies running at the same time.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Whether `run()` validates the graph before dispatching anything.
    #[serde(default = "default_true")]
    pub validate: bool,

    /// Add unknown-dependency and cycle detection to the reachability check.
    #[serde(default = "default_true")]
    pub strict_validation: bool,

    /// Name given to worker threads.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_true() -> bool {
    true
}

fn default_thread_name() -> String {
    "rundag-worker".to_string()
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            validate: true,
            strict_validation: true,
            thread_name: default_thread_name(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// If `None`, `RUNDAG_LOG` and then `info` are used.
    #[serde(default)]
    pub level: Option<LogLevel>,
}

/// Validated executor configuration.
///
/// Obtained from [`RawConfigFile`] via `TryFrom` (see `config::validate`)
/// or from [`ExecutorConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub workers: usize,
    pub validate: bool,
    pub strict_validation: bool,
    pub thread_name: String,
    pub log_level: Option<LogLevel>,
}

impl ExecutorConfig {
    /// Construct without validation; callers must have checked invariants.
    pub(crate) fn new_unchecked(executor: ExecutorSection, logging: LoggingSection) -> Self {
        Self {
            workers: executor.workers,
            validate: executor.validate,
            strict_validation: executor.strict_validation,
            thread_name: executor.thread_name,
            log_level: logging.level,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new_unchecked(ExecutorSection::default(), LoggingSection::default())
    }
}
