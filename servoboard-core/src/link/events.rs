//! Events that drive the link state machine

/// Link events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Caller asked to connect, or a reconnect is starting
    Connect,
    /// Transport opened
    Opened,
    /// Transport failed to open
    OpenFailed,
    /// Board sent READY
    ReadyReceived,
    /// Transport closed or failed
    Closed,
    /// Caller asked to disconnect
    Disconnect,
    /// Attempt deadline passed without READY
    HandshakeTimeout,
}
