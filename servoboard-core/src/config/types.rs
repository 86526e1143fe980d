//! Configuration type definitions

use servoboard_protocol::MAX_BOARD_ID;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default reconnect delay (ms)
pub const DEFAULT_RECONNECT_DELAY_MS: u32 = 3000;

/// Default delay before re-checking an empty or not-ready queue (ms)
pub const DEFAULT_SEND_RETRY_DELAY_MS: u32 = 20;

/// Default sync tick period (ms)
pub const DEFAULT_SYNC_PERIOD_MS: u32 = 20;

/// Per-board settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct BoardConfig {
    /// Board id (0-15)
    pub id: u8,
    /// Time allowed for open + READY before retrying, and the retry period
    pub reconnect_delay_ms: u32,
    /// How long the drain loop waits when it cannot send
    pub send_retry_delay_ms: u32,
    /// How often desired state is reconciled into instructions
    pub sync_period_ms: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            id: 0,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            send_retry_delay_ms: DEFAULT_SEND_RETRY_DELAY_MS,
            sync_period_ms: DEFAULT_SYNC_PERIOD_MS,
        }
    }
}

impl BoardConfig {
    /// Check ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id > MAX_BOARD_ID {
            return Err(ConfigError::InvalidBoardId(self.id));
        }
        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::ZeroDelay("reconnect_delay_ms"));
        }
        if self.send_retry_delay_ms == 0 {
            return Err(ConfigError::ZeroDelay("send_retry_delay_ms"));
        }
        if self.sync_period_ms == 0 {
            return Err(ConfigError::ZeroDelay("sync_period_ms"));
        }
        Ok(())
    }
}

/// Invalid configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Board id outside 0-15
    InvalidBoardId(u8),
    /// A delay or period was zero
    ZeroDelay(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidBoardId(id) => {
                write!(f, "board id {id} out of range 0-{MAX_BOARD_ID}")
            }
            ConfigError::ZeroDelay(field) => write!(f, "{field} must be greater than zero"),
        }
    }
}
