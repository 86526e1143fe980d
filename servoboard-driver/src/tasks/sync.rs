//! Sync task
//!
//! Reconciles desired servo state into queued instructions once per period.

use servoboard_hal::SerialLink;

use crate::driver::Driver;
use crate::shared::warn_dropped;

pub(crate) fn tick<L: SerialLink>(driver: &mut Driver<L>, now_ms: u64) {
    if now_ms < driver.next_sync_ms {
        return;
    }
    driver.next_sync_ms = now_ms + u64::from(driver.config.sync_period_ms);

    let (before, after, dropped) = driver.board.with(|board| {
        let before = board.queue().len();
        let dropped = board.sync_tick();
        (before, board.queue().len(), dropped)
    });
    if after != before {
        log::debug!("Sync tick: {} instruction(s) pending", after);
    }
    warn_dropped(&dropped);
}
