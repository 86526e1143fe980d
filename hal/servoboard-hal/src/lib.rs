//! Servo Board Hardware Abstraction Layer
//!
//! Defines the transport seam between the driver runtime and whatever carries
//! bytes to the board. The runtime only ever sees [`SerialLink`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Runtime (servoboard-driver)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  servoboard-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ SerialPortLink│       │   MockLink    │
//! │ (serialport)  │       │  (in-memory)  │
//! └───────────────┘       └───────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod link;

pub use link::{DataBits, LinkConfig, LinkError, LinkErrorKind, Parity, SerialLink, StopBits};
