//! Serial port transport

use std::io::{self, Read, Write};
use std::time::Duration;

use servoboard_hal::{DataBits, LinkConfig, LinkError, LinkErrorKind, Parity, SerialLink, StopBits};
use serialport::{FlowControl, SerialPort};

/// How long a read waits for the first byte
pub const READ_TIMEOUT: Duration = Duration::from_millis(5);

/// Serial transport errors
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Port(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Link used before `open`
    #[error("Serial port not open")]
    NotOpen,
}

impl LinkError for SerialError {
    fn kind(&self) -> LinkErrorKind {
        match self {
            SerialError::NotOpen => LinkErrorKind::Closed,
            SerialError::Port(err) => match err.kind() {
                serialport::ErrorKind::NoDevice => LinkErrorKind::Closed,
                serialport::ErrorKind::Io(kind) => io_kind(kind),
                _ => LinkErrorKind::Io,
            },
            SerialError::Io(err) => io_kind(err.kind()),
        }
    }
}

fn io_kind(kind: io::ErrorKind) -> LinkErrorKind {
    match kind {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset => LinkErrorKind::Closed,
        _ => LinkErrorKind::Io,
    }
}

/// Serial link to a board on a device path such as `/dev/ttyACM0`
pub struct SerialPortLink {
    path: String,
    config: LinkConfig,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortLink {
    /// Create a closed link; nothing is opened until [`SerialLink::open`]
    pub fn new(path: impl Into<String>, config: LinkConfig) -> Self {
        Self {
            path: path.into(),
            config,
            port: None,
        }
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, SerialError> {
        self.port.as_mut().ok_or(SerialError::NotOpen)
    }
}

impl SerialLink for SerialPortLink {
    type Error = SerialError;

    fn open(&mut self) -> Result<(), Self::Error> {
        self.port = None;

        let port = serialport::new(&self.path, self.config.baudrate)
            .data_bits(match self.config.data_bits {
                DataBits::Seven => serialport::DataBits::Seven,
                DataBits::Eight => serialport::DataBits::Eight,
            })
            .parity(match self.config.parity {
                Parity::None => serialport::Parity::None,
                Parity::Even => serialport::Parity::Even,
                Parity::Odd => serialport::Parity::Odd,
            })
            .stop_bits(match self.config.stop_bits {
                StopBits::One => serialport::StopBits::One,
                StopBits::Two => serialport::StopBits::Two,
            })
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;

        log::info!("Opened serial port: {} at {} baud", self.path, self.config.baudrate);
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            log::info!("Closed serial port: {}", self.path);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.port()?.read(buf) {
            // A zero-length read on a tty means the device went away
            Ok(0) if !buf.is_empty() => Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.port()?.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port()?.flush()?;
        Ok(())
    }
}
