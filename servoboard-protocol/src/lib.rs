//! Servo Board Communication Protocol
//!
//! This crate defines the serial protocol between a host and the 16-servo
//! controller board. Every message starts with a header byte that carries the
//! board id in its high nibble and the opcode in its low nibble.
//!
//! # Protocol Overview
//!
//! Host to board (instructions):
//! ```text
//! ┌──────────────────────┬─────────────┬──────┐
//! │ HEADER (id<<4 | op)  │ PAYLOAD     │ 0xFF │
//! │ 1B                   │ 0–16B       │ 1B   │
//! └──────────────────────┴─────────────┴──────┘
//! ```
//!
//! Board to host (responses):
//! ```text
//! ┌──────────────────────┬─────────────┬──────┐
//! │ HEADER (id<<4 | op)  │ PAYLOAD     │ 0xFF │
//! │ 1B                   │ exactly 16B │ 1B   │
//! └──────────────────────┴─────────────┴──────┘
//! ```
//!
//! The terminator is not escaped. A payload byte equal to `0xFF` ends the frame
//! early on the receiving side; goal bytes never reach it (they top out at 254)
//! but bitmasks and free-form messages can.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod errors;
pub mod frame;
pub mod instructions;
pub mod responses;

pub use errors::ErrorCode;
pub use frame::{
    header, split_header, BoardId, Frame, FrameError, FrameParser, InboundFrame, RawFrame,
    INBOUND_FRAME_SIZE, INBOUND_PAYLOAD_SIZE, MAX_BOARD_ID, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, TERMINATOR,
};
pub use instructions::{InputOpcode, Instruction};
pub use responses::{Message, OutputOpcode, Response};

/// Number of servo channels on a board
pub const SERVO_COUNT: usize = 16;
