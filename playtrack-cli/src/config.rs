//! Configuration module
//!
//! Handles CLI configuration including the console URL. Everything else is
//! read from the `PLAYTRACK_*` environment variables.

use anyhow::{Context, Result};
use playtrack_sync::SyncConfig;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the execution console
    pub console_url: String,
}

impl Config {
    /// Synchronizer settings for this invocation
    ///
    /// The console URL from the command line wins over the environment; an
    /// explicit `interval_ms` wins over `PLAYTRACK_POLL_INTERVAL_MS`.
    pub fn sync_config(&self, interval_ms: Option<u64>) -> Result<SyncConfig> {
        let mut config = SyncConfig::from_env().context("Invalid PLAYTRACK_* environment")?;
        config.console_url = self.console_url.clone();
        if let Some(ms) = interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}
