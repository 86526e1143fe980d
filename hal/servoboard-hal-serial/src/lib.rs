//! Host transports for the servo board driver
//!
//! - [`SerialPortLink`]: a real serial device via the `serialport` crate
//! - [`MockLink`]: an in-memory link for tests and simulation

pub mod mock;
pub mod serial;

pub use mock::{MockError, MockLink};
pub use serial::{SerialError, SerialPortLink};
