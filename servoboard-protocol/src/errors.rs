//! Board error codes

/// Error codes reported by the board in an ERROR message, or raised locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorCode {
    Unknown = 0,
    NoConnection = 1,
    InstructionIllegal = 2,
    ResponseIllegal = 3,
}

impl ErrorCode {
    /// Parse from a numeric code; anything unrecognised is `Unknown`
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ErrorCode::NoConnection,
            2 => ErrorCode::InstructionIllegal,
            3 => ErrorCode::ResponseIllegal,
            _ => ErrorCode::Unknown,
        }
    }

    /// Numeric code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Protocol name
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::NoConnection => "NO_CONNECTION",
            ErrorCode::InstructionIllegal => "INSTRUCTION_ILLEGAL",
            ErrorCode::ResponseIllegal => "RESPONSE_ILLEGAL",
        }
    }

    /// Human readable message
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::NoConnection => "No connection",
            ErrorCode::InstructionIllegal => "Illegal instruction",
            ErrorCode::ResponseIllegal => "Servo board returned an illegal response",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}
