//! Error types for the driver runtime

use servoboard_core::{ConfigError, UsageError};

/// Result type alias
pub type Result<T> = std::result::Result<T, DriverError>;

/// Driver error types
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// I/O error (reading configuration)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    Config(ConfigError),

    /// Baud rate of zero
    #[error("Invalid configuration: baudrate must be greater than zero")]
    InvalidBaudrate,

    /// Caller passed an invalid argument
    #[error("{0}")]
    Usage(UsageError),
}

impl From<ConfigError> for DriverError {
    fn from(err: ConfigError) -> Self {
        DriverError::Config(err)
    }
}

impl From<UsageError> for DriverError {
    fn from(err: UsageError) -> Self {
        DriverError::Usage(err)
    }
}
