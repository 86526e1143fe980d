//! Link state definition

use super::events::LinkEvent;

/// Link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No transport
    #[default]
    Disconnected,
    /// Transport open requested
    Connecting,
    /// Transport open, waiting for the board's READY
    AwaitingReady,
    /// Handshake done; frames may be sent
    Ready,
}

impl LinkState {
    /// Check if frames may be sent
    pub fn is_ready(&self) -> bool {
        matches!(self, LinkState::Ready)
    }

    /// Check if the transport is open
    pub fn is_open(&self) -> bool {
        matches!(self, LinkState::AwaitingReady | LinkState::Ready)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            // Disconnected transitions
            (Disconnected, Connect) => Connecting,
            (Disconnected, HandshakeTimeout) => Connecting,

            // Connecting transitions
            (Connecting, Opened) => AwaitingReady,
            (Connecting, OpenFailed) => Disconnected,
            (Connecting, HandshakeTimeout) => Connecting,

            // AwaitingReady transitions
            (AwaitingReady, ReadyReceived) => Ready,
            (AwaitingReady, HandshakeTimeout) => Connecting,

            // Loss and shutdown from anywhere
            (_, Closed) => Disconnected,
            (_, Disconnect) => Disconnected,

            // Default: stay in current state
            _ => self,
        }
    }
}
