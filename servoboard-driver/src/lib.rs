//! Host runtime for the 16-servo controller board
//!
//! Wires the pure [`servoboard_core::Board`] to a real transport:
//!
//! - [`BoardHandle`]: shared, lock-protected access to desired servo state
//! - [`Driver`]: single poll loop running the link, sync and drain tasks
//! - [`DriverConfig`]: TOML configuration
//! - [`ChannelObserver`] / [`FnObserver`]: ready-made notification sinks
//!
//! ```no_run
//! use servoboard_driver::{Driver, DriverConfig};
//! use std::sync::atomic::AtomicBool;
//!
//! let config = DriverConfig::from_file("board.toml")?;
//! let mut driver = Driver::from_config(&config)?;
//! let board = driver.handle();
//!
//! board.set_enabled(0, true)?;
//! board.set_goal(0, 0.5)?;
//!
//! let now = driver.now_ms();
//! driver.connect(now);
//! driver.run(&AtomicBool::new(false));
//! # Ok::<(), servoboard_driver::DriverError>(())
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod observer;
pub mod shared;
mod tasks;

pub use config::DriverConfig;
pub use driver::Driver;
pub use error::{DriverError, Result};
pub use observer::{ChannelObserver, FnObserver};
pub use shared::BoardHandle;

pub use servoboard_core::{BoardConfig, BoardObserver, LinkState, Notification};
pub use servoboard_protocol::ErrorCode;
