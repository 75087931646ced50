//! Common types shared across reader implementations.
//!
//! This module defines reader metadata and the parameter set handed to a
//! reader when an inventory round starts.

use crate::error::{HardwareError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uhfscan_core::{ModuleKind, OutputPower};

/// Reader information.
///
/// Contains metadata about the reader module such as its family and
/// firmware version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "Mock UHF Reader").
    pub name: String,

    /// Module family, which decides field encodings.
    pub module: ModuleKind,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, module: ModuleKind) -> Self {
        Self {
            name: name.into(),
            module,
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Air protocol used for an inventory round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagProtocol {
    /// ISO 18000-6C (EPC Gen2).
    #[default]
    Iso6c,

    /// ISO 18000-6B.
    Iso6b,

    /// GB/T 29768 national standard.
    Gb,
}

/// Parameters for starting an inventory round.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use uhfscan_core::OutputPower;
/// use uhfscan_hardware::InventoryParams;
///
/// let params = InventoryParams::default()
///     .with_power(OutputPower::new(25).unwrap())
///     .with_auto_stop(Duration::from_secs(10))
///     .unwrap();
///
/// assert_eq!(params.power.dbm(), 25);
/// assert_eq!(params.auto_stop_after, Some(Duration::from_secs(10)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryParams {
    /// Transmit power for the round.
    #[serde(default)]
    pub power: OutputPower,

    /// Air protocol.
    #[serde(default)]
    pub protocol: TagProtocol,

    /// Stop the round automatically after this long.
    #[serde(default)]
    pub auto_stop_after: Option<Duration>,
}

impl InventoryParams {
    /// Set the transmit power.
    pub fn with_power(mut self, power: OutputPower) -> Self {
        self.power = power;
        self
    }

    /// Set the air protocol.
    pub fn with_protocol(mut self, protocol: TagProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Stop the round automatically after `after` has elapsed.
    ///
    /// # Errors
    /// Returns a configuration error for a zero duration.
    pub fn with_auto_stop(mut self, after: Duration) -> Result<Self> {
        if after.is_zero() {
            return Err(HardwareError::configuration(
                "auto-stop duration must be greater than zero",
            ));
        }
        self.auto_stop_after = Some(after);
        Ok(self)
    }
}
