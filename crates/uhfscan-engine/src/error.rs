//! Error types for the inventory engine.

use thiserror::Error;
use uhfscan_hardware::HardwareError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors returned by the engine control surface.
///
/// The polling loop itself has no error path: empty pulls are normal and
/// rejected records are dropped. These errors only surface from lifecycle
/// and configuration calls.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine was destroyed and cannot be restarted.
    #[error("Inventory engine has been destroyed")]
    Destroyed,

    /// The polling thread could not be spawned.
    #[error("Failed to spawn inventory thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The reader refused a start request.
    #[error("Reader error: {0}")]
    Hardware(#[from] HardwareError),

    /// Domain validation error.
    #[error(transparent)]
    Core(#[from] uhfscan_core::Error),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error is permanent for this engine instance.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Destroyed | Self::Spawn(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            EngineError::Destroyed.to_string(),
            "Inventory engine has been destroyed"
        );
        assert_eq!(
            EngineError::config("poll interval must be positive").to_string(),
            "Configuration error: poll interval must be positive"
        );
    }

    #[test]
    fn test_error_from_hardware() {
        let err: EngineError = HardwareError::inventory_failed("antenna fault").into();
        assert!(matches!(err, EngineError::Hardware(_)));
        assert!(err.to_string().contains("antenna fault"));
        assert!(!err.is_terminal());
    }

    #[test]
    fn test_error_from_core() {
        let err: EngineError = uhfscan_core::Error::InvalidPower { value: 40, max: 33 }.into();
        assert_eq!(
            err.to_string(),
            "Output power 40 dBm exceeds maximum of 33 dBm"
        );
    }

    #[test]
    fn test_terminal_errors() {
        assert!(EngineError::Destroyed.is_terminal());
        let spawn = EngineError::Spawn(std::io::Error::other("no threads"));
        assert!(spawn.is_terminal());
    }
}
