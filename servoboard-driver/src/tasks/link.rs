//! Link task
//!
//! Checks the reconnect deadline and feeds inbound bytes to the frame parser.

use log::{debug, info, trace, warn};
use servoboard_core::FrameDisposition;
use servoboard_hal::{LinkError, LinkErrorKind, SerialLink};
use servoboard_protocol::RawFrame;

use crate::driver::Driver;

/// Buffer size for one read
const RX_BUF_SIZE: usize = 64;

/// Reads per poll before yielding to the other tasks
const MAX_READS_PER_POLL: usize = 16;

/// Retry a stalled connection attempt if its deadline passed
pub(crate) fn poll_deadline<L: SerialLink>(driver: &mut Driver<L>, now_ms: u64) {
    let effects = driver.board.with(|board| board.poll(now_ms));
    if !effects.is_empty() {
        debug!("Connection attempt timed out, retrying");
    }
    driver.apply(effects);
}

/// Read available bytes and dispatch complete frames
pub(crate) fn receive<L: SerialLink>(driver: &mut Driver<L>, now_ms: u64) {
    let mut buf = [0u8; RX_BUF_SIZE];

    for _ in 0..MAX_READS_PER_POLL {
        if !driver.link.is_open() {
            return;
        }

        match driver.link.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    if let Some(raw) = driver.parser.feed(byte) {
                        dispatch(driver, &raw);
                    }
                }
            }
            Err(e) => {
                link_failed(driver, e, now_ms);
                return;
            }
        }
    }
}

fn dispatch<L: SerialLink>(driver: &mut Driver<L>, raw: &RawFrame) {
    let (disposition, effects) = driver.board.with(|board| board.handle_frame(raw));

    match disposition {
        FrameDisposition::Handled(opcode) => trace!("RX {}", opcode.name()),
        FrameDisposition::ForeignId(id) => trace!("Ignoring frame from board {}", id),
        FrameDisposition::NotReady(opcode) => debug!("Ignoring {} before READY", opcode.name()),
        FrameDisposition::Rejected(err) => warn!("Illegal response from board: {}", err),
        FrameDisposition::Discarded(err) => {
            debug!("Dropping malformed frame before READY: {}", err)
        }
    }
    driver.apply(effects);
}

fn link_failed<L: SerialLink>(driver: &mut Driver<L>, err: L::Error, now_ms: u64) {
    let effects = match err.kind() {
        LinkErrorKind::Closed => {
            info!("Link closed: {:?}", err);
            driver.link.close();
            driver.parser.reset();
            driver.board.with(|board| board.link_closed(now_ms))
        }
        LinkErrorKind::Io => {
            warn!("Link error: {:?}", err);
            driver.board.with(|board| board.link_error(now_ms))
        }
    };
    driver.apply(effects);
}
