//! Board-agnostic core logic for the servo board driver
//!
//! This crate contains everything that does not touch the transport:
//!
//! - Servo state and goal/telemetry mapping
//! - De-duplicating instruction queue
//! - Sync loop (desired state vs. last sent snapshot)
//! - Link state machine (connect, handshake, reconnect)
//! - The `Board` aggregate tying them together
//! - Configuration types and the observer trait
//!
//! Nothing here blocks or reads a clock. Time is passed in as milliseconds and
//! every operation that needs I/O returns [`Effect`]s for the runtime to apply.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod board;
pub mod config;
pub mod effect;
pub mod error;
pub mod link;
pub mod queue;
pub mod servo;
pub mod sync;
pub mod traits;

pub use board::{Board, FrameDisposition};
pub use config::{BoardConfig, ConfigError};
pub use effect::{Effect, Effects};
pub use error::UsageError;
pub use link::{Link, LinkEvent, LinkState};
pub use queue::{InstructionQueue, QUEUE_CAPACITY};
pub use servo::Servo;
pub use sync::{SentSnapshot, SyncPlan};
pub use traits::{BoardObserver, Notification};
