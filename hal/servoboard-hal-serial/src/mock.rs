//! In-memory link for tests and simulation
//!
//! Clones share state, so a test can keep one handle to inject board output
//! and inspect written frames while the driver owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use servoboard_hal::{LinkError, LinkErrorKind, SerialLink};

/// Mock link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    #[error("mock link not open")]
    NotOpen,
    #[error("mock link closed by peer")]
    PeerClosed,
    #[error("mock open failure")]
    OpenFailed,
    #[error("mock write failure")]
    WriteFailed,
}

impl LinkError for MockError {
    fn kind(&self) -> LinkErrorKind {
        match self {
            MockError::NotOpen | MockError::PeerClosed => LinkErrorKind::Closed,
            MockError::OpenFailed | MockError::WriteFailed => LinkErrorKind::Io,
        }
    }
}

/// Shared, scriptable in-memory link
#[derive(Clone, Default)]
pub struct MockLink {
    inner: Arc<Mutex<MockLinkInner>>,
}

#[derive(Default)]
struct MockLinkInner {
    open: bool,
    fail_open: bool,
    fail_write: bool,
    peer_closed: bool,
    open_count: usize,
    read_buffer: VecDeque<u8>,
    written: Vec<Vec<u8>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockLinkInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue bytes for the driver to read
    pub fn inject_read(&self, data: &[u8]) {
        self.lock().read_buffer.extend(data);
    }

    /// Every buffer passed to `write_all`, in order
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.lock().written.clone()
    }

    /// Forget recorded writes
    pub fn clear_written(&self) {
        self.lock().written.clear();
    }

    /// Make subsequent `open` calls fail
    pub fn set_fail_open(&self, fail: bool) {
        self.lock().fail_open = fail;
    }

    /// Make subsequent writes fail
    pub fn set_fail_write(&self, fail: bool) {
        self.lock().fail_write = fail;
    }

    /// Simulate the board going away; the next read reports it
    pub fn close_from_peer(&self) {
        let mut inner = self.lock();
        inner.peer_closed = true;
        inner.read_buffer.clear();
    }

    /// Number of successful opens so far
    pub fn open_count(&self) -> usize {
        self.lock().open_count
    }
}

impl SerialLink for MockLink {
    type Error = MockError;

    fn open(&mut self) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        if inner.fail_open {
            inner.open = false;
            return Err(MockError::OpenFailed);
        }
        inner.open = true;
        inner.peer_closed = false;
        inner.open_count += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.lock().open = false;
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut inner = self.lock();
        if !inner.open {
            return Err(MockError::NotOpen);
        }
        if inner.peer_closed {
            inner.open = false;
            return Err(MockError::PeerClosed);
        }

        let available = inner.read_buffer.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(inner.read_buffer.drain(..available)) {
            *slot = byte;
        }
        Ok(available)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        if !inner.open {
            return Err(MockError::NotOpen);
        }
        if inner.fail_write {
            return Err(MockError::WriteFailed);
        }
        inner.written.push(data.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_state_between_clones() {
        let wire = MockLink::new();
        let mut link = wire.clone();

        link.open().unwrap();
        link.write_all(&[0x03, 0xFF]).unwrap();
        wire.inject_read(&[0x00, 0x01]);

        let mut buf = [0u8; 8];
        assert_eq!(link.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[0x00, 0x01]);
        assert_eq!(wire.written(), vec![vec![0x03, 0xFF]]);
        assert_eq!(wire.open_count(), 1);
    }

    #[test]
    fn test_peer_close_reported_once() {
        let wire = MockLink::new();
        let mut link = wire.clone();
        link.open().unwrap();

        wire.close_from_peer();
        let mut buf = [0u8; 4];
        assert_eq!(link.read(&mut buf), Err(MockError::PeerClosed));
        assert!(!link.is_open());
        assert_eq!(link.read(&mut buf).unwrap_err().kind(), LinkErrorKind::Closed);
    }

    #[test]
    fn test_scripted_failures() {
        let wire = MockLink::new();
        let mut link = wire.clone();

        wire.set_fail_open(true);
        assert_eq!(link.open(), Err(MockError::OpenFailed));

        wire.set_fail_open(false);
        link.open().unwrap();
        wire.set_fail_write(true);
        assert_eq!(link.write_all(&[1]).unwrap_err().kind(), LinkErrorKind::Io);
    }
}
