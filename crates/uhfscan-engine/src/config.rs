//! Engine configuration.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it overrides:
//!
//! ```
//! use uhfscan_engine::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str("poll_interval_ms = 10").unwrap();
//! assert_eq!(config.poll_interval_ms, 10);
//! assert_eq!(config.idle_interval_ms, 20);
//! ```

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use uhfscan_core::{
    OutputPower,
    constants::{
        AUDIO_LOSS_THRESHOLD_MS, BEEP_INTERVAL_MS, DEFAULT_IDLE_INTERVAL_MS, DEFAULT_OUTPUT_POWER,
        DEFAULT_POLL_INTERVAL_MS, RATE_WINDOW_MS, TAG_LOST_THRESHOLD_MS,
    },
};

/// Timing and gating configuration for the inventory engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sleep after an empty pull in an active mode.
    pub poll_interval_ms: u64,

    /// Sleep between iterations while idle.
    pub idle_interval_ms: u64,

    /// Length of one read-rate window.
    pub rate_window_ms: u64,

    /// Silence after which a located tag is reported lost.
    pub lost_threshold_ms: u64,

    /// Silence after which audio feedback stops.
    pub audio_loss_ms: u64,

    /// Period of the inventory feedback beep.
    pub beep_interval_ms: u64,

    /// Initial output power in dBm. Zero disables reading.
    pub output_power: u8,

    /// Initial TID prefix filter.
    pub read_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            idle_interval_ms: DEFAULT_IDLE_INTERVAL_MS,
            rate_window_ms: RATE_WINDOW_MS,
            lost_threshold_ms: TAG_LOST_THRESHOLD_MS,
            audio_loss_ms: AUDIO_LOSS_THRESHOLD_MS,
            beep_interval_ms: BEEP_INTERVAL_MS,
            output_power: DEFAULT_OUTPUT_POWER,
            read_filter: None,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document, filling missing fields with defaults.
    ///
    /// # Errors
    /// Returns `EngineError::Config` if the document is malformed or fails
    /// validation.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EngineError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `EngineError::Io` if the file cannot be read, or
    /// `EngineError::Config` if it is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns `EngineError::Config` for a zero interval or threshold, and
    /// `EngineError::Core` for an out-of-range output power.
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("idle_interval_ms", self.idle_interval_ms),
            ("rate_window_ms", self.rate_window_ms),
            ("lost_threshold_ms", self.lost_threshold_ms),
            ("audio_loss_ms", self.audio_loss_ms),
            ("beep_interval_ms", self.beep_interval_ms),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, ms)| *ms == 0) {
            return Err(EngineError::config(format!("{name} must be greater than zero")));
        }
        self.output_power()?;
        Ok(())
    }

    /// Initial output power.
    ///
    /// # Errors
    /// Returns `EngineError::Core` if the value exceeds the module maximum.
    pub fn output_power(&self) -> Result<OutputPower> {
        Ok(OutputPower::new(self.output_power)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }

    pub fn lost_threshold(&self) -> Duration {
        Duration::from_millis(self.lost_threshold_ms)
    }

    pub fn audio_loss(&self) -> Duration {
        Duration::from_millis(self.audio_loss_ms)
    }

    pub fn beep_interval(&self) -> Duration {
        Duration::from_millis(self.beep_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(5));
        assert_eq!(config.idle_interval(), Duration::from_millis(20));
        assert_eq!(config.rate_window(), Duration::from_millis(1000));
        assert_eq!(config.lost_threshold(), Duration::from_millis(2000));
        assert_eq!(config.audio_loss(), Duration::from_millis(600));
        assert_eq!(config.beep_interval(), Duration::from_millis(600));
        assert_eq!(config.output_power().unwrap().dbm(), 30);
        assert_eq!(config.read_filter, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            lost_threshold_ms = 3000
            output_power = 0
            read_filter = "582004"
            "#,
        )
        .unwrap();

        assert_eq!(config.lost_threshold_ms, 3000);
        assert!(config.output_power().unwrap().is_off());
        assert_eq!(config.read_filter.as_deref(), Some("582004"));
        assert_eq!(config.poll_interval_ms, 5);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = EngineConfig::from_toml_str("rate_window_ms = 0");
        match result {
            Err(EngineError::Config(message)) => assert!(message.contains("rate_window_ms")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_excessive_power() {
        let result = EngineConfig::from_toml_str("output_power = 40");
        assert!(matches!(result, Err(EngineError::Core(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = EngineConfig::from_toml_str("poll_interval_ms = \"fast\"");
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load("/nonexistent/uhfscan.toml");
        assert!(matches!(result, Err(EngineError::Io(_))));
    }
}
