//! Sync loop
//!
//! Compares the desired servo state with what was last decided to be sent and
//! plans the instructions needed to close the gap.

pub mod reconciler;
pub mod snapshot;

pub use reconciler::{reconcile, SyncPlan};
pub use snapshot::SentSnapshot;
