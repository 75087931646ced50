use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Record errors
    #[error("Invalid tag record: {0}")]
    InvalidRecord(String),

    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),

    // Settings errors
    #[error("Output power {value} dBm exceeds maximum of {max} dBm")]
    InvalidPower { value: u8, max: u8 },

    #[error("Unknown data type view: {0}")]
    InvalidDataType(String),

    #[error("Unknown operating mode: {0}")]
    InvalidMode(String),

    #[error("Unknown reader module: {0}")]
    UnknownModule(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
