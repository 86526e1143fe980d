//! Link state machine
//!
//! Tracks the connection to the board through open, handshake and loss, and
//! decides when to retry. [`LinkState`] is the pure transition table; [`Link`]
//! adds the reconnect flag and attempt deadline and turns transitions into
//! effects.

pub mod events;
pub mod machine;

pub use events::LinkEvent;
pub use machine::LinkState;

use servoboard_protocol::ErrorCode;

use crate::effect::{push, Effect, Effects};
use crate::traits::Notification;

/// What a READY frame meant for the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadyOutcome {
    /// Handshake completed
    Connected,
    /// Board re-announced itself while already ready (it probably restarted)
    Refreshed,
    /// No open link to attach it to
    Ignored,
}

/// Connection manager
#[derive(Debug, Clone)]
pub struct Link {
    state: LinkState,
    reconnect_enabled: bool,
    deadline: Option<u64>,
    reconnect_delay_ms: u32,
}

impl Link {
    pub fn new(reconnect_delay_ms: u32) -> Self {
        Self {
            state: LinkState::Disconnected,
            reconnect_enabled: false,
            deadline: None,
            reconnect_delay_ms,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn reconnect_enabled(&self) -> bool {
        self.reconnect_enabled
    }

    /// When the current attempt times out, if one is armed
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Start connecting and keep reconnecting until [`Link::disconnect`]
    ///
    /// A no-op while an attempt is already in progress or the link is up.
    pub fn connect(&mut self, now_ms: u64) -> Effects {
        let mut effects = Effects::new();
        self.reconnect_enabled = true;
        if self.state == LinkState::Disconnected {
            self.begin_attempt(LinkEvent::Connect, now_ms, &mut effects);
        }
        effects
    }

    /// The transport opened
    pub fn link_opened(&mut self) -> Effects {
        let mut effects = Effects::new();
        if self.state == LinkState::Connecting {
            self.state = self.state.transition(LinkEvent::Opened);
        } else {
            // Attempt was abandoned while the open was in flight
            push(&mut effects, Effect::CloseLink);
        }
        effects
    }

    /// The transport failed to open; the armed deadline drives the retry
    pub fn link_open_failed(&mut self) -> Effects {
        let mut effects = Effects::new();
        if self.state == LinkState::Connecting {
            self.state = self.state.transition(LinkEvent::OpenFailed);
            push(&mut effects, Effect::Notify(Notification::Error(ErrorCode::NoConnection)));
        }
        effects
    }

    /// A READY frame from our board arrived
    pub fn ready_received(&mut self) -> (ReadyOutcome, Effects) {
        let mut effects = Effects::new();
        let outcome = match self.state {
            LinkState::AwaitingReady => {
                self.state = self.state.transition(LinkEvent::ReadyReceived);
                self.deadline = None;
                push(&mut effects, Effect::Notify(Notification::Connect));
                ReadyOutcome::Connected
            }
            LinkState::Ready => ReadyOutcome::Refreshed,
            LinkState::Disconnected | LinkState::Connecting => ReadyOutcome::Ignored,
        };
        (outcome, effects)
    }

    /// The transport closed (peer went away or we closed it)
    pub fn link_closed(&mut self, now_ms: u64) -> Effects {
        let mut effects = Effects::new();
        self.close_path(now_ms, &mut effects);
        effects
    }

    /// The transport reported an error
    pub fn link_error(&mut self, now_ms: u64) -> Effects {
        let mut effects = Effects::new();
        push(&mut effects, Effect::Notify(Notification::Error(ErrorCode::NoConnection)));
        if self.state.is_open() {
            push(&mut effects, Effect::CloseLink);
        }
        self.close_path(now_ms, &mut effects);
        effects
    }

    /// Check the attempt deadline
    pub fn poll(&mut self, now_ms: u64) -> Effects {
        let mut effects = Effects::new();
        let Some(deadline) = self.deadline else {
            return effects;
        };
        if now_ms < deadline {
            return effects;
        }

        if !self.reconnect_enabled || self.state.is_ready() {
            self.deadline = None;
            return effects;
        }

        if self.state.is_open() {
            push(&mut effects, Effect::CloseLink);
        }
        self.begin_attempt(LinkEvent::HandshakeTimeout, now_ms, &mut effects);
        effects
    }

    /// Close the link and stop reconnecting; safe in any state
    pub fn disconnect(&mut self) -> Effects {
        let mut effects = Effects::new();
        self.reconnect_enabled = false;
        self.deadline = None;

        if self.state.is_open() {
            push(&mut effects, Effect::CloseLink);
        }
        if self.state.is_ready() {
            push(&mut effects, Effect::Notify(Notification::Disconnect));
        }
        self.state = self.state.transition(LinkEvent::Disconnect);
        effects
    }

    fn close_path(&mut self, now_ms: u64, effects: &mut Effects) {
        if self.state == LinkState::Disconnected {
            return;
        }
        let was_ready = self.state.is_ready();
        self.state = self.state.transition(LinkEvent::Closed);

        if was_ready {
            push(effects, Effect::Notify(Notification::Disconnect));
        }
        if self.reconnect_enabled {
            self.begin_attempt(LinkEvent::Connect, now_ms, effects);
        } else {
            self.deadline = None;
        }
    }

    fn begin_attempt(&mut self, event: LinkEvent, now_ms: u64, effects: &mut Effects) {
        self.state = self.state.transition(event);
        self.deadline = Some(now_ms + u64::from(self.reconnect_delay_ms));
        push(effects, Effect::OpenLink);
    }
}
