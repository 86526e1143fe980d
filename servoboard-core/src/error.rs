//! Caller misuse errors

use servoboard_protocol::{FrameError, MAX_BOARD_ID, SERVO_COUNT};

/// Returned immediately when a caller passes an invalid argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsageError {
    /// Board id outside 0-15
    InvalidBoardId(u8),
    /// Servo index outside 0-15
    InvalidServoIndex(usize),
    /// Instruction could not be framed
    Frame(FrameError),
}

impl From<FrameError> for UsageError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::InvalidBoardId(id) => UsageError::InvalidBoardId(id),
            other => UsageError::Frame(other),
        }
    }
}

impl core::fmt::Display for UsageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UsageError::InvalidBoardId(id) => {
                write!(f, "servo board id must be in the range 0-{MAX_BOARD_ID}, got {id}")
            }
            UsageError::InvalidServoIndex(index) => {
                write!(f, "servo index must be below {SERVO_COUNT}, got {index}")
            }
            UsageError::Frame(err) => write!(f, "malformed instruction: {err}"),
        }
    }
}
