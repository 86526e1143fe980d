//! Driver configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid.

mod loader;

use serde::{Deserialize, Serialize};
use servoboard_core::BoardConfig;
use servoboard_hal::LinkConfig;

use crate::error::{DriverError, Result};

/// Default serial device
pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

/// Default baud rate
pub const DEFAULT_BAUDRATE: u32 = 115200;

/// Top-level driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverConfig {
    /// System path to the board's serial port
    pub device: String,
    /// Serial baud rate
    pub baudrate: u32,
    /// Board settings
    pub board: BoardConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baudrate: DEFAULT_BAUDRATE,
            board: BoardConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Check every value is in range
    pub fn validate(&self) -> Result<()> {
        if self.baudrate == 0 {
            return Err(DriverError::InvalidBaudrate);
        }
        self.board.validate()?;
        Ok(())
    }

    /// Serial settings for the link (8N1 at the configured baud rate)
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig::with_baudrate(self.baudrate)
    }
}
