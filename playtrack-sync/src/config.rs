//! Synchronizer configuration
//!
//! Console connection settings, polling interval and how snapshot output
//! is interpreted.

use playtrack_core::OutputMode;
use std::time::Duration;

/// Default console address used by local installs
pub const DEFAULT_CONSOLE_URL: &str = "http://localhost:5000";

/// Synchronizer configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Console base URL (e.g., "http://localhost:5000")
    pub console_url: String,

    /// How often each tracked job is polled
    pub poll_interval: Duration,

    /// Maximum time a single status request may take
    pub request_timeout: Duration,

    /// Whether snapshots carry the whole output or only new lines
    pub output_mode: OutputMode,
}

impl SyncConfig {
    /// Creates a new configuration with defaults
    pub fn new(console_url: String) -> Self {
        Self {
            console_url,
            poll_interval: Duration::from_millis(2000),
            request_timeout: Duration::from_secs(10),
            output_mode: OutputMode::Cumulative,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - PLAYTRACK_CONSOLE_URL (optional, default: http://localhost:5000)
    /// - PLAYTRACK_POLL_INTERVAL_MS (optional, default: 2000)
    /// - PLAYTRACK_REQUEST_TIMEOUT_SECS (optional, default: 10)
    /// - PLAYTRACK_OUTPUT_MODE (optional, `cumulative` or `incremental`)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let console_url =
            lookup("PLAYTRACK_CONSOLE_URL").unwrap_or_else(|| DEFAULT_CONSOLE_URL.to_string());
        let mut config = Self::new(console_url);

        if let Some(ms) = lookup("PLAYTRACK_POLL_INTERVAL_MS").and_then(|s| s.parse::<u64>().ok())
        {
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(secs) =
            lookup("PLAYTRACK_REQUEST_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(mode) = lookup("PLAYTRACK_OUTPUT_MODE") {
            config.output_mode = mode
                .parse()
                .map_err(|e| anyhow::anyhow!("PLAYTRACK_OUTPUT_MODE: {}", e))?;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.console_url.is_empty() {
            anyhow::bail!("console_url cannot be empty");
        }

        if !self.console_url.starts_with("http://") && !self.console_url.starts_with("https://") {
            anyhow::bail!("console_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONSOLE_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.console_url, "http://localhost:5000");
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.output_mode, OutputMode::Cumulative);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Invalid URL should fail
        config.console_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.console_url = "https://console.internal".to_string();
        assert!(config.validate().is_ok());

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            ("PLAYTRACK_CONSOLE_URL", "http://console:8080"),
            ("PLAYTRACK_POLL_INTERVAL_MS", "500"),
            ("PLAYTRACK_REQUEST_TIMEOUT_SECS", "not-a-number"),
            ("PLAYTRACK_OUTPUT_MODE", "incremental"),
        ]))
        .unwrap();

        assert_eq!(config.console_url, "http://console:8080");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.output_mode, OutputMode::Incremental);
    }

    #[test]
    fn test_from_lookup_rejects_unknown_mode() {
        let result = SyncConfig::from_lookup(lookup_from(&[("PLAYTRACK_OUTPUT_MODE", "diff")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = SyncConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.console_url, DEFAULT_CONSOLE_URL);
    }
}
