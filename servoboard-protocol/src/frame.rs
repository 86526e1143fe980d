//! Frame encoding and decoding for the servo board protocol.
//!
//! Outbound frame format:
//! - HEADER (1 byte): board id in the high nibble, input opcode in the low nibble
//! - PAYLOAD (0-16 bytes): opcode-specific arguments
//! - TERMINATOR (1 byte): 0xFF
//!
//! Inbound frames use the same header and terminator but always carry a
//! 16-byte payload. The receiving side splits the byte stream on the
//! terminator, so length is validated only after a whole chunk has arrived.

use heapless::Vec;

use crate::instructions::InputOpcode;

/// End-of-frame marker
pub const TERMINATOR: u8 = 0xFF;

/// Highest addressable board id (4 bits)
pub const MAX_BOARD_ID: u8 = 15;

/// Maximum outbound payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 16;

/// Fixed inbound payload size in bytes
pub const INBOUND_PAYLOAD_SIZE: usize = 16;

/// Maximum complete outbound frame size (HEADER + MAX_PAYLOAD + TERMINATOR)
pub const MAX_FRAME_SIZE: usize = 1 + MAX_PAYLOAD_SIZE + 1;

/// Complete inbound frame size including the terminator
pub const INBOUND_FRAME_SIZE: usize = 1 + INBOUND_PAYLOAD_SIZE + 1;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Opcode is not an input opcode, or the payload does not fit it
    IllegalInstruction,
    /// Board id outside 0-15
    InvalidBoardId(u8),
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Inbound payload was not exactly 16 bytes
    WrongLength(usize),
    /// Inbound opcode is not a known output opcode
    UnknownOpcode(u8),
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::PayloadTooLarge => write!(f, "payload exceeds {MAX_PAYLOAD_SIZE} bytes"),
            FrameError::IllegalInstruction => write!(f, "illegal instruction"),
            FrameError::InvalidBoardId(id) => {
                write!(f, "board id {id} out of range 0-{MAX_BOARD_ID}")
            }
            FrameError::BufferTooSmall => write!(f, "buffer too small"),
            FrameError::WrongLength(len) => {
                write!(f, "payload is {len} bytes, expected {INBOUND_PAYLOAD_SIZE}")
            }
            FrameError::UnknownOpcode(op) => write!(f, "unknown opcode {op}"),
        }
    }
}

/// 4-bit board address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardId(u8);

impl BoardId {
    /// Create a board id, rejecting values above 15
    pub fn new(id: u8) -> Result<Self, FrameError> {
        if id > MAX_BOARD_ID {
            return Err(FrameError::InvalidBoardId(id));
        }
        Ok(Self(id))
    }

    /// Raw id value (0-15)
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for BoardId {
    type Error = FrameError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<BoardId> for u8 {
    fn from(id: BoardId) -> Self {
        id.0
    }
}

/// Pack a board id and opcode into a header byte
pub const fn header(id: BoardId, opcode: u8) -> u8 {
    (id.0 << 4) | (opcode & 0x0F)
}

/// Split a header byte into (board id, opcode)
pub const fn split_header(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0F)
}

/// An outbound frame, ready to be queued and written
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    header: u8,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame for the given board, opcode and payload
    ///
    /// The opcode must be one of the input opcodes and the payload length must
    /// match what that opcode expects.
    pub fn new(id: BoardId, opcode: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let op = InputOpcode::from_code(opcode).ok_or(FrameError::IllegalInstruction)?;
        if !op.accepts_payload_len(payload.len()) {
            return Err(FrameError::IllegalInstruction);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            header: header(id, opcode),
            payload: payload_vec,
        })
    }

    /// Header byte (id << 4 | opcode)
    pub fn header(&self) -> u8 {
        self.header
    }

    /// Board id this frame is addressed to
    pub fn board_id(&self) -> u8 {
        split_header(self.header).0
    }

    /// Input opcode of this frame
    pub fn opcode(&self) -> u8 {
        split_header(self.header).1
    }

    /// Payload bytes (without header and terminator)
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Size of the encoded frame in bytes
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 2
    }

    /// True if a payload byte collides with the terminator
    ///
    /// The protocol has no escaping, so the board will cut such a frame short.
    pub fn contains_terminator(&self) -> bool {
        self.payload.contains(&TERMINATOR)
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.header;
        buffer[1..1 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[1 + self.payload.len()] = TERMINATOR;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// One terminator-delimited chunk of the inbound byte stream
///
/// Holds the header and at most 16 payload bytes. `payload_len` records how
/// many payload bytes actually arrived, so an overlong chunk is still
/// reported with its true length.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame {
    header: u8,
    payload: Vec<u8, INBOUND_PAYLOAD_SIZE>,
    payload_len: usize,
}

impl RawFrame {
    /// Build a raw frame from the bytes of one chunk (terminator excluded)
    ///
    /// Returns `None` for an empty chunk.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&header, rest) = bytes.split_first()?;
        let kept = rest.len().min(INBOUND_PAYLOAD_SIZE);
        let mut payload = Vec::new();
        // kept never exceeds the capacity
        let _ = payload.extend_from_slice(&rest[..kept]);
        Some(Self {
            header,
            payload,
            payload_len: rest.len(),
        })
    }

    /// Header byte
    pub fn header(&self) -> u8 {
        self.header
    }

    /// Sender board id
    pub fn board_id(&self) -> u8 {
        split_header(self.header).0
    }

    /// Opcode nibble
    pub fn opcode(&self) -> u8 {
        split_header(self.header).1
    }

    /// Number of payload bytes received (may exceed what is retained)
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }
}

/// A validated inbound frame with its fixed 16-byte payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundFrame {
    /// Sender board id
    pub board_id: u8,
    /// Output opcode nibble (not yet checked against the known set)
    pub opcode: u8,
    /// Payload data
    pub payload: [u8; INBOUND_PAYLOAD_SIZE],
}

impl InboundFrame {
    /// Encode this frame the way the board sends it (for testing or simulation)
    pub fn encode_to_vec(&self) -> Vec<u8, INBOUND_FRAME_SIZE> {
        let mut vec = Vec::new();
        let _ = vec.push(((self.board_id & 0x0F) << 4) | (self.opcode & 0x0F));
        let _ = vec.extend_from_slice(&self.payload);
        let _ = vec.push(TERMINATOR);
        vec
    }
}

impl TryFrom<&RawFrame> for InboundFrame {
    type Error = FrameError;

    fn try_from(raw: &RawFrame) -> Result<Self, Self::Error> {
        if raw.payload_len != INBOUND_PAYLOAD_SIZE {
            return Err(FrameError::WrongLength(raw.payload_len));
        }

        let mut payload = [0u8; INBOUND_PAYLOAD_SIZE];
        payload.copy_from_slice(&raw.payload);

        Ok(Self {
            board_id: raw.board_id(),
            opcode: raw.opcode(),
            payload,
        })
    }
}

/// Splits the inbound byte stream into terminator-delimited chunks
#[derive(Debug, Clone, Default)]
pub struct FrameParser {
    header: Option<u8>,
    payload: Vec<u8, INBOUND_PAYLOAD_SIZE>,
    payload_len: usize,
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the parser state, discarding any partial chunk
    pub fn reset(&mut self) {
        self.header = None;
        self.payload.clear();
        self.payload_len = 0;
    }

    /// True if part of a chunk has been buffered
    pub fn is_mid_frame(&self) -> bool {
        self.header.is_some()
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Some(frame)` when a terminator closes a non-empty chunk.
    /// Stray terminators (empty chunks) are skipped.
    pub fn feed(&mut self, byte: u8) -> Option<RawFrame> {
        if byte == TERMINATOR {
            let frame = self.header.take().map(|header| RawFrame {
                header,
                payload: core::mem::take(&mut self.payload),
                payload_len: self.payload_len,
            });
            self.payload_len = 0;
            return frame;
        }

        match self.header {
            None => self.header = Some(byte),
            Some(_) => {
                // Overlong chunks keep counting but stop buffering
                let _ = self.payload.push(byte);
                self.payload_len = self.payload_len.saturating_add(1);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::InputOpcode;
    use proptest::prelude::*;

    fn id(value: u8) -> BoardId {
        BoardId::new(value).unwrap()
    }

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::new(id(9), InputOpcode::DebugEnable.code(), &[]).unwrap();
        let mut buffer = [0u8; 4];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 2);
        assert_eq!(buffer[0], 0x90);
        assert_eq!(buffer[1], TERMINATOR);
    }

    #[test]
    fn test_frame_encode_with_payload() {
        let frame = Frame::new(id(2), InputOpcode::ServosEnabled.code(), &[0b0000_0101]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(encoded.as_slice(), &[0x24, 0b0000_0101, TERMINATOR]);
        assert_eq!(frame.board_id(), 2);
        assert_eq!(frame.opcode(), 4);
    }

    #[test]
    fn test_frame_rejects_output_only_opcode() {
        let result = Frame::new(id(0), 0x0A, &[]);
        assert_eq!(result, Err(FrameError::IllegalInstruction));
    }

    #[test]
    fn test_frame_rejects_wrong_payload_for_opcode() {
        // SET_ID takes exactly one byte
        assert_eq!(
            Frame::new(id(0), InputOpcode::SetId.code(), &[]),
            Err(FrameError::IllegalInstruction)
        );
        // Debug toggles take none
        assert_eq!(
            Frame::new(id(0), InputOpcode::DebugDisable.code(), &[1]),
            Err(FrameError::IllegalInstruction)
        );
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        let result = Frame::new(id(0), InputOpcode::ServosGoal.code(), &large_payload);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = Frame::new(id(1), InputOpcode::ServosGoal.code(), &[0; 16]).unwrap();
        let mut buffer = [0u8; 10];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_contains_terminator() {
        let frame = Frame::new(id(1), InputOpcode::ServosEnabled.code(), &[0xFF]).unwrap();
        assert!(frame.contains_terminator());

        let frame = Frame::new(id(1), InputOpcode::ServosEnabled.code(), &[0x7F]).unwrap();
        assert!(!frame.contains_terminator());
    }

    #[test]
    fn test_board_id_range() {
        assert!(BoardId::new(15).is_ok());
        assert_eq!(BoardId::new(16), Err(FrameError::InvalidBoardId(16)));
    }

    #[test]
    fn test_parser_splits_on_terminator() {
        let mut parser = FrameParser::new();
        let mut bytes = [7u8; INBOUND_FRAME_SIZE];
        bytes[0] = 0x34; // board 3, opcode 4
        bytes[INBOUND_FRAME_SIZE - 1] = TERMINATOR;

        let mut frames = 0;
        for &b in &bytes {
            if let Some(raw) = parser.feed(b) {
                frames += 1;
                assert_eq!(raw.board_id(), 3);
                assert_eq!(raw.opcode(), 4);
                assert_eq!(raw.payload_len(), 16);

                let inbound = InboundFrame::try_from(&raw).unwrap();
                assert_eq!(inbound.payload, [7u8; 16]);
            }
        }
        assert_eq!(frames, 1);
        assert!(!parser.is_mid_frame());
    }

    #[test]
    fn test_parser_skips_stray_terminators() {
        let mut parser = FrameParser::new();
        assert!(parser.feed(TERMINATOR).is_none());
        assert!(parser.feed(TERMINATOR).is_none());
        assert!(!parser.is_mid_frame());
    }

    #[test]
    fn test_short_frame_reports_length() {
        let raw = RawFrame::from_bytes(&[0x01, 1, 2, 3]).unwrap();
        assert_eq!(
            InboundFrame::try_from(&raw),
            Err(FrameError::WrongLength(3))
        );
    }

    #[test]
    fn test_overlong_frame_reports_true_length() {
        let mut parser = FrameParser::new();
        parser.feed(0x11);
        for _ in 0..20 {
            parser.feed(0x00);
        }
        let raw = parser.feed(TERMINATOR).unwrap();
        assert_eq!(raw.payload_len(), 20);
        assert_eq!(
            InboundFrame::try_from(&raw),
            Err(FrameError::WrongLength(20))
        );
    }

    #[test]
    fn test_inbound_encode_matches_parser() {
        let frame = InboundFrame {
            board_id: 5,
            opcode: 1,
            payload: *b"hello servo boar",
        };
        let bytes = frame.encode_to_vec();

        let mut parser = FrameParser::new();
        let raw = bytes.iter().find_map(|&b| parser.feed(b)).unwrap();
        assert_eq!(InboundFrame::try_from(&raw).unwrap(), frame);
    }

    proptest! {
        #[test]
        fn prop_board_id_nibble_roundtrip(board in 0u8..=MAX_BOARD_ID, op in 0u8..=5) {
            let frame = Frame::new(id(board), op, match op {
                0 | 1 => &[][..],
                3 => &[0u8; 16][..],
                _ => &[1u8][..],
            }).unwrap();
            prop_assert_eq!(frame.board_id(), board);
            prop_assert_eq!(frame.opcode(), op);
            prop_assert_eq!(split_header(header(id(board), op)), (board, op));
        }

        #[test]
        fn prop_parser_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut parser = FrameParser::new();
            for b in bytes {
                if let Some(raw) = parser.feed(b) {
                    let _ = InboundFrame::try_from(&raw);
                }
            }
        }
    }
}
