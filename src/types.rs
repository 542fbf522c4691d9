use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use serde::Deserialize;

/// Identifier of a task within one executor.
///
/// Blanket-implemented for anything hashable, printable and shareable
/// across threads (`&'static str`, `String`, integers, small enums...).
/// `Display` is what ends up in error messages and log fields.
pub trait TaskKey: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}

impl<T> TaskKey for T where T: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}

/// Log verbosity accepted in the `[logging]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "invalid log level: {other} (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
