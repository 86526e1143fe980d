//! Conversion between normalized values and wire bytes

use servoboard_protocol::instructions::MAX_GOAL;

/// Largest value a goal, position or load byte takes on the wire
pub const WIRE_MAX: u8 = MAX_GOAL;

/// Linearly map `x` from `[in_min, in_max]` onto `[out_min, out_max]`
///
/// No clamping is applied; values outside the input range extrapolate.
pub fn map_range(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Convert a normalized goal to its wire byte
///
/// NaN becomes 0, values are clamped to `[0, 1]`, then scaled to `0..=254` and
/// rounded half up.
pub fn goal_to_wire(goal: f32) -> u8 {
    if goal.is_nan() {
        return 0;
    }
    let scaled = map_range(goal.clamp(0.0, 1.0), 0.0, 1.0, 0.0, f32::from(WIRE_MAX));
    // Non-negative, so truncating after +0.5 rounds half up
    (scaled + 0.5) as u8
}

/// Convert a telemetry byte to a normalized value (`byte / 254`)
pub fn wire_to_normalized(byte: u8) -> f32 {
    map_range(f32::from(byte), 0.0, f32::from(WIRE_MAX), 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_goal_endpoints() {
        assert_eq!(goal_to_wire(0.0), 0);
        assert_eq!(goal_to_wire(1.0), 254);
        assert_eq!(goal_to_wire(0.5), 127);
    }

    #[test]
    fn test_goal_clamped() {
        assert_eq!(goal_to_wire(1.7), 254);
        assert_eq!(goal_to_wire(-0.3), 0);
        assert_eq!(goal_to_wire(f32::NAN), 0);
        assert_eq!(goal_to_wire(f32::INFINITY), 254);
        assert_eq!(goal_to_wire(f32::NEG_INFINITY), 0);
    }

    #[test]
    fn test_rounds_half_up() {
        // 0.25 * 254 = 63.5
        assert_eq!(goal_to_wire(0.25), 64);
    }

    #[test]
    fn test_telemetry_scaling() {
        assert_eq!(wire_to_normalized(0), 0.0);
        assert_eq!(wire_to_normalized(254), 1.0);
        assert!((wire_to_normalized(127) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_map_range_extrapolates() {
        assert_eq!(map_range(2.0, 0.0, 1.0, 0.0, 10.0), 20.0);
    }

    proptest! {
        #[test]
        fn prop_goal_always_in_wire_range(goal in any::<f32>()) {
            prop_assert!(goal_to_wire(goal) <= WIRE_MAX);
        }

        #[test]
        fn prop_goal_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(goal_to_wire(lo) <= goal_to_wire(hi));
        }
    }
}
