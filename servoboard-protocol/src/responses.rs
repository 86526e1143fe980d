//! Board to host responses

use crate::errors::ErrorCode;
use crate::frame::{BoardId, FrameError, InboundFrame, INBOUND_PAYLOAD_SIZE};
use crate::SERVO_COUNT;

/// Free-form 16-byte INFO/DEBUG message body, passed through unmodified
pub type Message = [u8; INBOUND_PAYLOAD_SIZE];

/// Output opcodes (low nibble of an inbound header)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OutputOpcode {
    Ready = 0,
    Info = 1,
    Debug = 2,
    Error = 3,
    AllServosPosition = 4,
    AllServosLoad = 5,
}

impl OutputOpcode {
    /// Parse opcode from its numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(OutputOpcode::Ready),
            1 => Some(OutputOpcode::Info),
            2 => Some(OutputOpcode::Debug),
            3 => Some(OutputOpcode::Error),
            4 => Some(OutputOpcode::AllServosPosition),
            5 => Some(OutputOpcode::AllServosLoad),
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
            OutputOpcode::Ready => "READY",
            OutputOpcode::Info => "INFO",
            OutputOpcode::Debug => "DEBUG",
            OutputOpcode::Error => "ERROR",
            OutputOpcode::AllServosPosition => "ALL_SERVOS_POSITION",
            OutputOpcode::AllServosLoad => "ALL_SERVOS_LOAD",
        }
    }
}

/// A decoded response from the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Board finished its handshake
    Ready,
    /// Informational message
    Info(Message),
    /// Debug message (only sent while debug is enabled)
    Debug(Message),
    /// Board reported an error; code is the first payload byte
    Error(ErrorCode),
    /// Raw position per servo, 0-254
    AllServosPosition([u8; SERVO_COUNT]),
    /// Raw load per servo, 0-254
    AllServosLoad([u8; SERVO_COUNT]),
}

impl Response {
    /// Opcode for this response
    pub fn opcode(&self) -> OutputOpcode {
        match self {
            Response::Ready => OutputOpcode::Ready,
            Response::Info(_) => OutputOpcode::Info,
            Response::Debug(_) => OutputOpcode::Debug,
            Response::Error(_) => OutputOpcode::Error,
            Response::AllServosPosition(_) => OutputOpcode::AllServosPosition,
            Response::AllServosLoad(_) => OutputOpcode::AllServosLoad,
        }
    }

    /// Decode from a length-checked inbound frame
    pub fn from_frame(frame: &InboundFrame) -> Result<Self, FrameError> {
        let opcode =
            OutputOpcode::from_code(frame.opcode).ok_or(FrameError::UnknownOpcode(frame.opcode))?;
        let payload = frame.payload;

        Ok(match opcode {
            OutputOpcode::Ready => Response::Ready,
            OutputOpcode::Info => Response::Info(payload),
            OutputOpcode::Debug => Response::Debug(payload),
            OutputOpcode::Error => Response::Error(ErrorCode::from_code(payload[0])),
            OutputOpcode::AllServosPosition => Response::AllServosPosition(payload),
            OutputOpcode::AllServosLoad => Response::AllServosLoad(payload),
        })
    }

    /// Encode as the board would send it (for testing or simulation)
    pub fn to_frame(&self, id: BoardId) -> InboundFrame {
        let payload = match self {
            Response::Ready => [0u8; INBOUND_PAYLOAD_SIZE],
            Response::Info(msg) | Response::Debug(msg) => *msg,
            Response::Error(code) => {
                let mut payload = [0u8; INBOUND_PAYLOAD_SIZE];
                payload[0] = code.code();
                payload
            }
            Response::AllServosPosition(values) | Response::AllServosLoad(values) => *values,
        };

        InboundFrame {
            board_id: id.get(),
            opcode: self.opcode().code(),
            payload,
        }
    }
}
