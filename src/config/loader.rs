// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ExecutorConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** check value
/// ranges. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Parse configuration from an in-memory TOML string.
pub fn parse_str(contents: &str) -> Result<RawConfigFile> {
    let config: RawConfigFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Rejects a zero worker count and an empty thread name.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ExecutorConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ExecutorConfig::try_from(raw_config)?;
    Ok(config)
}
