//! Host to board instructions

use heapless::Vec;

use crate::frame::{BoardId, Frame, FrameError};
use crate::SERVO_COUNT;

/// Highest goal byte sent on the wire
pub const MAX_GOAL: u8 = 254;

/// Input opcodes (low nibble of an outbound header)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InputOpcode {
    DebugEnable = 0,
    DebugDisable = 1,
    SetId = 2,
    ServosGoal = 3,
    ServosEnabled = 4,
    ServosCalibrate = 5,
}

impl InputOpcode {
    pub const ALL: [InputOpcode; 6] = [
        InputOpcode::DebugEnable,
        InputOpcode::DebugDisable,
        InputOpcode::SetId,
        InputOpcode::ServosGoal,
        InputOpcode::ServosEnabled,
        InputOpcode::ServosCalibrate,
    ];

    /// Parse opcode from its numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(InputOpcode::DebugEnable),
            1 => Some(InputOpcode::DebugDisable),
            2 => Some(InputOpcode::SetId),
            3 => Some(InputOpcode::ServosGoal),
            4 => Some(InputOpcode::ServosEnabled),
            5 => Some(InputOpcode::ServosCalibrate),
            _ => None,
        }
    }

    /// Numeric code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Protocol name
    pub fn name(self) -> &'static str {
        match self {
            InputOpcode::DebugEnable => "DEBUG_ENABLE",
            InputOpcode::DebugDisable => "DEBUG_DISABLE",
            InputOpcode::SetId => "SET_ID",
            InputOpcode::ServosGoal => "SERVOS_GOAL",
            InputOpcode::ServosEnabled => "SERVOS_ENABLED",
            InputOpcode::ServosCalibrate => "SERVOS_CALIBRATE",
        }
    }

    /// Whether a payload of `len` bytes is valid for this opcode
    ///
    /// Goals carry one byte per servo starting at servo 0; masks carry the low
    /// byte and, when any of servos 8-15 is set, the high byte.
    pub fn accepts_payload_len(self, len: usize) -> bool {
        match self {
            InputOpcode::DebugEnable | InputOpcode::DebugDisable => len == 0,
            InputOpcode::SetId => len == 1,
            InputOpcode::ServosGoal => (1..=SERVO_COUNT).contains(&len),
            InputOpcode::ServosEnabled | InputOpcode::ServosCalibrate => (1..=2).contains(&len),
        }
    }
}

/// A typed instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instruction {
    /// Ask the board to start sending DEBUG messages
    DebugEnable,
    /// Ask the board to stop sending DEBUG messages
    DebugDisable,
    /// Reassign the board's id
    SetId(BoardId),
    /// Goal position per servo, 0-254
    ServosGoal([u8; SERVO_COUNT]),
    /// Bit i = servo i enabled
    ServosEnabled(u16),
    /// Bit i = calibrate servo i
    ServosCalibrate(u16),
}

/// Encode a servo bitmask: low byte, then the high byte if non-zero or `wide`
///
/// A one-byte mask does not address servos 8-15 at all, so clearing any of
/// them needs the wide form.
pub fn encode_mask(mask: u16, wide: bool) -> Vec<u8, 2> {
    let [low, high] = mask.to_le_bytes();
    let mut bytes = Vec::new();
    let _ = bytes.push(low);
    if wide || high != 0 {
        let _ = bytes.push(high);
    }
    bytes
}

impl Instruction {
    /// Opcode for this instruction
    pub fn opcode(&self) -> InputOpcode {
        match self {
            Instruction::DebugEnable => InputOpcode::DebugEnable,
            Instruction::DebugDisable => InputOpcode::DebugDisable,
            Instruction::SetId(_) => InputOpcode::SetId,
            Instruction::ServosGoal(_) => InputOpcode::ServosGoal,
            Instruction::ServosEnabled(_) => InputOpcode::ServosEnabled,
            Instruction::ServosCalibrate(_) => InputOpcode::ServosCalibrate,
        }
    }

    /// Convert to a frame addressed to `id`
    pub fn to_frame(&self, id: BoardId) -> Result<Frame, FrameError> {
        self.encode(id, false)
    }

    /// Like [`Instruction::to_frame`], but masks always carry both bytes
    pub fn to_wide_frame(&self, id: BoardId) -> Result<Frame, FrameError> {
        self.encode(id, true)
    }

    fn encode(&self, id: BoardId, wide_mask: bool) -> Result<Frame, FrameError> {
        let opcode = self.opcode().code();
        match self {
            Instruction::DebugEnable | Instruction::DebugDisable => Frame::new(id, opcode, &[]),
            Instruction::SetId(new_id) => Frame::new(id, opcode, &[new_id.get()]),
            Instruction::ServosGoal(goals) => {
                if goals.iter().any(|&g| g > MAX_GOAL) {
                    return Err(FrameError::IllegalInstruction);
                }
                Frame::new(id, opcode, goals)
            }
            Instruction::ServosEnabled(mask) | Instruction::ServosCalibrate(mask) => {
                Frame::new(id, opcode, &encode_mask(*mask, wide_mask))
            }
        }
    }
}
