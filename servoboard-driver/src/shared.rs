//! Shared board state
//!
//! The driver's poll loop and any number of caller threads touch the same
//! [`Board`]. Each call takes the lock once, so every operation is atomic with
//! respect to sync ticks, drains and inbound handling.

use std::cell::RefCell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use servoboard_core::{Board, LinkState, Servo, UsageError};
use servoboard_protocol::{BoardId, Instruction};

type SharedBoard = Mutex<CriticalSectionRawMutex, RefCell<Board>>;

/// Cloneable handle to a board owned by a [`crate::Driver`]
#[derive(Clone)]
pub struct BoardHandle {
    inner: Arc<SharedBoard>,
}

impl BoardHandle {
    pub(crate) fn new(board: Board) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RefCell::new(board))),
        }
    }

    /// Run `f` with exclusive access to the board
    ///
    /// `f` must not call back into this handle.
    pub fn with<R>(&self, f: impl FnOnce(&mut Board) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Set a servo's normalized goal (clamped to 0.0-1.0 when sent)
    pub fn set_goal(&self, index: usize, goal: f32) -> Result<(), UsageError> {
        self.with(|board| board.set_goal(index, goal))
    }

    pub fn set_enabled(&self, index: usize, enabled: bool) -> Result<(), UsageError> {
        self.with(|board| board.set_enabled(index, enabled))
    }

    /// Request a one-shot calibration of one servo
    pub fn calibrate(&self, index: usize) -> Result<(), UsageError> {
        self.with(|board| board.calibrate(index))
    }

    /// Copy of one servo's state
    pub fn servo(&self, index: usize) -> Result<Servo, UsageError> {
        self.with(|board| board.servo(index).copied())
    }

    /// Last reported position (0.0 to 1.0)
    pub fn position(&self, index: usize) -> Result<f32, UsageError> {
        self.servo(index).map(|s| s.position())
    }

    /// Last reported load (0.0 to 1.0)
    pub fn load(&self, index: usize) -> Result<f32, UsageError> {
        self.servo(index).map(|s| s.load())
    }

    pub fn id(&self) -> BoardId {
        self.with(|board| board.id())
    }

    /// Reassign the board id; SET_ID goes out addressed to the old id
    pub fn set_id(&self, new_id: u8) -> Result<(), UsageError> {
        let (old, dropped) = self.with(|board| {
            let old = board.id();
            board.set_id(new_id).map(|dropped| (old, dropped))
        })?;
        log::debug!("Enqueued SET_ID {} -> {}", old.get(), new_id);
        warn_dropped(dropped.as_slice());
        Ok(())
    }

    pub fn debug_enable(&self) -> Result<(), UsageError> {
        self.enqueue(Instruction::DebugEnable)
    }

    pub fn debug_disable(&self) -> Result<(), UsageError> {
        self.enqueue(Instruction::DebugDisable)
    }

    /// Enqueue an arbitrary instruction for this board
    pub fn enqueue(&self, instruction: Instruction) -> Result<(), UsageError> {
        let dropped = self.with(|board| board.enqueue(instruction))?;
        log::debug!("Enqueued {}", instruction.opcode().name());
        warn_dropped(dropped.as_slice());
        Ok(())
    }

    pub fn link_state(&self) -> LinkState {
        self.with(|board| board.link_state())
    }

    pub fn is_ready(&self) -> bool {
        self.with(|board| board.is_ready())
    }

    /// Number of frames waiting to be written
    pub fn pending_instructions(&self) -> usize {
        self.with(|board| board.queue().len())
    }
}

pub(crate) fn warn_dropped(dropped: &[servoboard_protocol::Frame]) {
    for frame in dropped {
        log::warn!(
            "Instruction queue full, dropped frame with header {:#04x}",
            frame.header()
        );
    }
}
