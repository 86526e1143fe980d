//! Drain task
//!
//! Writes queued frames while the board is ready. After a successful write the
//! next frame goes out immediately; otherwise the queue is re-checked after
//! `send_retry_delay_ms`.

use log::{trace, warn};
use servoboard_hal::SerialLink;

use crate::driver::Driver;

pub(crate) fn drain<L: SerialLink>(driver: &mut Driver<L>, now_ms: u64) {
    if now_ms < driver.next_drain_ms {
        return;
    }

    while let Some(frame) = driver.board.with(|board| board.next_frame()) {
        if frame.contains_terminator() {
            warn!(
                "Frame {:#04x} carries a 0xFF payload byte; the board will cut it short",
                frame.header()
            );
        }

        let bytes = match frame.encode_to_vec() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Dropping unencodable frame {:#04x}: {}", frame.header(), e);
                continue;
            }
        };

        let written = driver
            .link
            .write_all(&bytes)
            .and_then(|()| driver.link.flush());

        match written {
            Ok(()) => {
                trace!("TX: {:02x?}", bytes.as_slice());
                let effects = driver.board.with(|board| board.frame_sent(frame));
                driver.apply(effects);
            }
            Err(e) => {
                warn!("Write failed: {:?}", e);
                let effects = driver.board.with(|board| board.write_failed(frame, now_ms));
                driver.apply(effects);
                break;
            }
        }
    }

    driver.next_drain_ms = now_ms + u64::from(driver.config.send_retry_delay_ms);
}
