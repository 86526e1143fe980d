//! Board observer trait
//!
//! Notifications are delivered in the order the board produced them.

use servoboard_protocol::{ErrorCode, Frame, Message};

/// Something observers may want to know about
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// Board completed its handshake
    Connect,
    /// Ready link was lost or closed
    Disconnect,
    /// INFO message from the board
    Info(Message),
    /// DEBUG message from the board
    Debug(Message),
    /// Error reported by the board or raised locally
    Error(ErrorCode),
    /// Frame written to the link
    Sent(Frame),
}

/// Receives board notifications
///
/// Every method has a no-op default, so implementors only override what
/// they care about.
pub trait BoardObserver {
    fn on_connect(&mut self) {}

    fn on_disconnect(&mut self) {}

    fn on_info(&mut self, _message: &Message) {}

    fn on_debug(&mut self, _message: &Message) {}

    fn on_error(&mut self, _code: ErrorCode) {}

    fn on_send(&mut self, _frame: &Frame) {}

    /// Entry point used by the runtime; routes to the methods above
    fn on_notification(&mut self, notification: &Notification) {
        dispatch(self, notification);
    }
}

/// Route a notification to the matching observer method
pub fn dispatch<O: BoardObserver + ?Sized>(observer: &mut O, notification: &Notification) {
    match notification {
        Notification::Connect => observer.on_connect(),
        Notification::Disconnect => observer.on_disconnect(),
        Notification::Info(message) => observer.on_info(message),
        Notification::Debug(message) => observer.on_debug(message),
        Notification::Error(code) => observer.on_error(*code),
        Notification::Sent(frame) => observer.on_send(frame),
    }
}
