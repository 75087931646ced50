//! Error types for reader driver operations.
//!
//! This module defines error types specific to the reader boundary: starting
//! an inventory round, decoding module-specific fields and validating
//! inventory parameters.

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur at the reader driver boundary.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The reader refused to start an inventory round.
    #[error("Inventory failed to start: {message}")]
    InventoryFailed { message: String },

    /// Signal strength could not be decoded for this module.
    #[error("Invalid RSSI '{raw}' for {module} module")]
    InvalidRssi { raw: String, module: String },

    /// Inventory parameters are not acceptable.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Domain validation error.
    #[error(transparent)]
    Core(#[from] uhfscan_core::Error),
}

impl HardwareError {
    /// Create a new inventory start error.
    pub fn inventory_failed(message: impl Into<String>) -> Self {
        Self::InventoryFailed {
            message: message.into(),
        }
    }

    /// Create a new RSSI decoding error.
    pub fn invalid_rssi(raw: impl Into<String>, module: uhfscan_core::ModuleKind) -> Self {
        Self::InvalidRssi {
            raw: raw.into(),
            module: module.name().to_string(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uhfscan_core::ModuleKind;

    #[test]
    fn test_inventory_failed_error() {
        let error = HardwareError::inventory_failed("antenna fault");
        assert!(matches!(error, HardwareError::InventoryFailed { .. }));
        assert_eq!(error.to_string(), "Inventory failed to start: antenna fault");
    }

    #[test]
    fn test_invalid_rssi_error() {
        let error = HardwareError::invalid_rssi("ZZ", ModuleKind::Um);
        assert_eq!(error.to_string(), "Invalid RSSI 'ZZ' for UM module");
    }

    #[test]
    fn test_core_error_passthrough() {
        let error: HardwareError = uhfscan_core::Error::InvalidPower { value: 40, max: 33 }.into();
        assert_eq!(
            error.to_string(),
            "Output power 40 dBm exceeds maximum of 33 dBm"
        );
    }
}
