//! Estimator configuration
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! TOML file, and command-line flags.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::capture::DEFAULT_SNAPSHOT_SLACK;

/// Default tick length, matching a 100 Hz scheduler tick
pub const DEFAULT_TICK_MS: u64 = 10;

/// Configuration of the scheduling environment being measured
///
/// # Example
/// ```
/// use rtstats::config::EstimatorConfig;
///
/// let config = EstimatorConfig::default();
/// assert_eq!(config.processor_count, 1);
/// assert_eq!(config.snapshot_slack, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default = "EstimatorConfig::detected", deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Number of symmetric cores sharing one global run-time clock
    ///
    /// Per-task shares are divided by this, so a task saturating one of four
    /// cores reports 25%.
    pub processor_count: u32,

    /// Extra capture buffer slots beyond the reported task count
    pub snapshot_slack: usize,

    /// Length of one scheduler tick in milliseconds
    pub tick_ms: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            processor_count: 1,
            snapshot_slack: DEFAULT_SNAPSHOT_SLACK,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl EstimatorConfig {
    /// Defaults with `processor_count` set to the host's available parallelism
    pub fn detected() -> Self {
        let processor_count = std::thread::available_parallelism()
            .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX))
            .unwrap_or(1);
        Self {
            processor_count,
            ..Self::default()
        }
    }

    /// Load a configuration from a TOML file
    ///
    /// Missing keys fall back to [`EstimatorConfig::detected`] values.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Wall-clock length of one tick
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.processor_count == 0 {
            return Err("processor_count must be >= 1, got 0".to_string());
        }

        if self.tick_ms == 0 {
            return Err("tick_ms must be >= 1, got 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EstimatorConfig::default();
        assert_eq!(config.processor_count, 1);
        assert_eq!(config.snapshot_slack, 5);
        assert_eq!(config.tick_ms, 10);
        assert_eq!(config.tick(), Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_detected_config_has_processors() {
        let config = EstimatorConfig::detected();
        assert!(config.processor_count >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_processor_count() {
        let mut config = EstimatorConfig::default();
        config.processor_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_tick() {
        let mut config = EstimatorConfig::default();
        config.tick_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_slack_is_valid() {
        let config = EstimatorConfig {
            snapshot_slack: 0,
            ..EstimatorConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_full() {
        let config = EstimatorConfig::from_toml_str(
            "processor_count = 2\nsnapshot_slack = 8\ntick_ms = 1\n",
        )
        .unwrap();
        assert_eq!(
            config,
            EstimatorConfig {
                processor_count: 2,
                snapshot_slack: 8,
                tick_ms: 1,
            }
        );
    }

    #[test]
    fn test_from_toml_partial_uses_detected() {
        let config = EstimatorConfig::from_toml_str("tick_ms = 4\n").unwrap();
        assert_eq!(config.tick_ms, 4);
        assert_eq!(config.snapshot_slack, DEFAULT_SNAPSHOT_SLACK);
        assert_eq!(
            config.processor_count,
            EstimatorConfig::detected().processor_count
        );
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        assert!(EstimatorConfig::from_toml_str("cores = 4\n").is_err());
    }

    #[test]
    fn test_from_toml_rejects_invalid_values() {
        let err = EstimatorConfig::from_toml_str("processor_count = 0\n").unwrap_err();
        assert!(err.to_string().contains("processor_count"));
    }
}
