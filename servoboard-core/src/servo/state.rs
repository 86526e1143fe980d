//! Per-servo state

use super::mapping::{goal_to_wire, wire_to_normalized};

/// One servo channel on the board
///
/// Goal, enabled and calibrate are desired state written by callers. Position
/// and load are telemetry written only when the board reports them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Servo {
    index: u8,
    goal: f32,
    enabled: bool,
    calibrate_requested: bool,
    position: f32,
    load: f32,
}

impl Servo {
    pub(crate) fn new(index: u8) -> Self {
        Self {
            index,
            goal: 0.0,
            enabled: false,
            calibrate_requested: false,
            position: 0.0,
            load: 0.0,
        }
    }

    /// Channel index (0-15)
    pub fn index(&self) -> usize {
        usize::from(self.index)
    }

    /// Set the normalized goal
    ///
    /// Any value is accepted; it is clamped to `[0, 1]` (NaN to 0) when the
    /// goal is next converted for the wire.
    pub fn set_goal(&mut self, goal: f32) {
        self.goal = goal;
    }

    /// Goal as last set by the caller
    pub fn goal(&self) -> f32 {
        self.goal
    }

    /// Goal byte that will be sent
    pub fn wire_goal(&self) -> u8 {
        goal_to_wire(self.goal)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Request a one-shot calibration
    pub fn calibrate(&mut self) {
        self.calibrate_requested = true;
    }

    /// True until the request has been folded into an outgoing instruction
    pub fn calibrate_requested(&self) -> bool {
        self.calibrate_requested
    }

    /// Consume the calibration request
    pub(crate) fn take_calibrate(&mut self) -> bool {
        core::mem::replace(&mut self.calibrate_requested, false)
    }

    /// Last reported position (0.0 to 1.0)
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Last reported load (0.0 to 1.0)
    pub fn load(&self) -> f32 {
        self.load
    }

    pub(crate) fn set_position_raw(&mut self, byte: u8) {
        self.position = wire_to_normalized(byte);
    }

    pub(crate) fn set_load_raw(&mut self, byte: u8) {
        self.load = wire_to_normalized(byte);
    }
}

/// Build the fixed array of 16 servos, indexed 0-15
pub(crate) fn servo_bank() -> [Servo; servoboard_protocol::SERVO_COUNT] {
    core::array::from_fn(|i| Servo::new(i as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_servo_defaults() {
        let servo = Servo::new(3);
        assert_eq!(servo.index(), 3);
        assert_eq!(servo.goal(), 0.0);
        assert!(!servo.is_enabled());
        assert!(!servo.calibrate_requested());
    }

    #[test]
    fn test_goal_stored_verbatim() {
        let mut servo = Servo::new(0);
        servo.set_goal(1.5);
        assert_eq!(servo.goal(), 1.5);
        assert_eq!(servo.wire_goal(), 254);
    }

    #[test]
    fn test_calibrate_is_one_shot() {
        let mut servo = Servo::new(0);
        servo.calibrate();
        assert!(servo.take_calibrate());
        assert!(!servo.take_calibrate());
        assert!(!servo.calibrate_requested());
    }

    #[test]
    fn test_bank_indices() {
        let bank = servo_bank();
        for (i, servo) in bank.iter().enumerate() {
            assert_eq!(servo.index(), i);
        }
    }
}
