//! Side effects requested by the core
//!
//! The core never touches the transport. Operations that would open or close
//! the link, or tell observers something, return these for the runtime to
//! apply in order.

use crate::traits::Notification;

/// One requested side effect
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Open the transport, then report `link_opened` or `link_open_failed`
    OpenLink,
    /// Close the transport
    CloseLink,
    /// Deliver a notification to every observer
    Notify(Notification),
}

/// Maximum effects produced by a single operation
pub const MAX_EFFECTS: usize = 8;

/// Effects in the order they must be applied
pub type Effects = heapless::Vec<Effect, MAX_EFFECTS>;

pub(crate) fn push(effects: &mut Effects, effect: Effect) {
    // No operation produces more than MAX_EFFECTS
    let _ = effects.push(effect);
}

pub(crate) fn extend(effects: &mut Effects, more: Effects) {
    for effect in more {
        push(effects, effect);
    }
}
