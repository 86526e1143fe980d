//! Ready-made observers

use std::sync::mpsc::{self, Receiver, Sender};

use servoboard_core::{BoardObserver, Notification};

/// Forwards every notification into a channel
///
/// Lets another thread consume board events without implementing
/// [`BoardObserver`]. A dropped receiver is ignored.
pub struct ChannelObserver {
    tx: Sender<Notification>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<Notification>) -> Self {
        Self { tx }
    }

    /// Create an observer together with its receiving end
    pub fn channel() -> (Self, Receiver<Notification>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl BoardObserver for ChannelObserver {
    fn on_notification(&mut self, notification: &Notification) {
        let _ = self.tx.send(notification.clone());
    }
}

/// Calls a closure for every notification
pub struct FnObserver<F>(pub F);

impl<F: FnMut(&Notification)> BoardObserver for FnObserver<F> {
    fn on_notification(&mut self, notification: &Notification) {
        (self.0)(notification);
    }
}
