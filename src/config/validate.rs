// src/config/validate.rs

use crate::config::model::{ExecutorConfig, RawConfigFile};
use crate::errors::{Result, RundagError};

impl TryFrom<RawConfigFile> for ExecutorConfig {
    type Error = RundagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ExecutorConfig::new_unchecked(raw.executor, raw.logging))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    // log level is strongly typed and checked during deserialization.
    if cfg.executor.workers == 0 {
        return Err(RundagError::ConfigError(
            "[executor].workers must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.executor.thread_name.trim().is_empty() {
        return Err(RundagError::ConfigError(
            "[executor].thread_name must not be empty".to_string(),
        ));
    }

    Ok(())
}
