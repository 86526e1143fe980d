//! Servo state and value mapping
//!
//! Callers work in normalized units (0.0 to 1.0); the wire carries 0-254.

pub mod mapping;
pub mod state;

pub use mapping::{goal_to_wire, map_range, wire_to_normalized, WIRE_MAX};
pub use state::Servo;
