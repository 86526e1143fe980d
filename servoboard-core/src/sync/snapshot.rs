//! Record of the last instructions decided to be sent

use servoboard_protocol::SERVO_COUNT;

/// What the sync loop last enqueued
///
/// This is intent, not confirmation: a frame recorded here may still be
/// pending, superseded, or lost with the link. The whole value is replaced at
/// the end of each tick and reset whenever the board reports READY.
/// Calibration is one-shot and consumed from the servos, so it is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SentSnapshot {
    /// Last goal vector, `None` until one has been sent
    pub goals: Option<[u8; SERVO_COUNT]>,
    /// Last enabled mask (bit i = servo i)
    pub enabled: u16,
}

impl SentSnapshot {
    /// Empty snapshot: forces the next tick to send goals
    pub const fn empty() -> Self {
        Self {
            goals: None,
            enabled: 0,
        }
    }
}
