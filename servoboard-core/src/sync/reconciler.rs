//! Desired state reconciliation

use servoboard_protocol::SERVO_COUNT;

use super::snapshot::SentSnapshot;
use crate::servo::Servo;

/// Instructions one sync tick should enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncPlan {
    /// Goal vector to send, if it changed
    pub goals: Option<[u8; SERVO_COUNT]>,
    /// Enabled mask to send, if it changed
    pub enabled: Option<u16>,
    /// Calibrate mask to send, if any servo requested it
    pub calibrate: Option<u16>,
    /// Snapshot to install once the plan is enqueued
    pub next: SentSnapshot,
}

impl SyncPlan {
    /// True if nothing needs sending
    pub fn is_empty(&self) -> bool {
        self.goals.is_none() && self.enabled.is_none() && self.calibrate.is_none()
    }
}

/// Plan the instructions that bring the board in line with `servos`
///
/// Calibration requests are consumed: each servo that contributed to the
/// calibrate mask has its request cleared.
pub fn reconcile(servos: &mut [Servo; SERVO_COUNT], last: &SentSnapshot) -> SyncPlan {
    let mut goals = [0u8; SERVO_COUNT];
    let mut enabled = 0u16;
    let mut calibrate = 0u16;

    for (i, servo) in servos.iter_mut().enumerate() {
        goals[i] = servo.wire_goal();
        if servo.is_enabled() {
            enabled |= 1 << i;
        }
        if servo.take_calibrate() {
            calibrate |= 1 << i;
        }
    }

    let goals_changed = last.goals != Some(goals);
    let enabled_changed = enabled != last.enabled;

    SyncPlan {
        goals: goals_changed.then_some(goals),
        enabled: enabled_changed.then_some(enabled),
        calibrate: (calibrate != 0).then_some(calibrate),
        next: SentSnapshot {
            goals: Some(goals),
            enabled,
        },
    }
}
