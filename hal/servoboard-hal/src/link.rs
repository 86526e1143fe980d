//! Serial link abstraction
//!
//! A link is opened, read and written by a single owner. Reads never block
//! for long: an implementation returns `Ok(0)` when no byte arrived within
//! its short internal timeout.

/// How a transport error should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkErrorKind {
    /// The peer went away or the link is not open
    Closed,
    /// Any other I/O failure
    Io,
}

/// Transport error classification
pub trait LinkError: core::fmt::Debug {
    fn kind(&self) -> LinkErrorKind;
}

/// Byte transport to a servo board
pub trait SerialLink {
    /// Error type for link operations
    type Error: LinkError;

    /// Open the link; opening an already open link reopens it
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Close the link; closing a closed link is a no-op
    fn close(&mut self);

    /// Check if the link is open
    fn is_open(&self) -> bool;

    /// Read whatever bytes are available
    ///
    /// Returns `Ok(0)` if nothing arrived before the read timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write an entire buffer
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl LinkConfig {
    /// 8N1 at the given baud rate
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
