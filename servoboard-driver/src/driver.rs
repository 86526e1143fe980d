//! Driver runtime
//!
//! One poll loop owns the transport and runs three tasks in order:
//!
//! - link: deadlines, inbound bytes, transport errors
//! - sync: reconcile desired servo state every `sync_period_ms`
//! - drain: write queued frames back-to-back while the board is ready
//!
//! Time is a millisecond counter supplied by the caller, so tests can step it
//! by hand. [`Driver::run`] uses a monotonic clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use servoboard_core::{Board, BoardConfig, BoardObserver, Effect, Effects, Notification};
use servoboard_hal::SerialLink;
use servoboard_hal_serial::SerialPortLink;
use servoboard_protocol::FrameParser;

use crate::config::DriverConfig;
use crate::error::Result;
use crate::shared::BoardHandle;
use crate::tasks;

/// Longest the run loop sleeps before checking for inbound bytes (ms)
pub const RX_POLL_INTERVAL_MS: u64 = 2;

/// Host runtime for one board
pub struct Driver<L: SerialLink> {
    pub(crate) board: BoardHandle,
    pub(crate) link: L,
    pub(crate) parser: FrameParser,
    pub(crate) config: BoardConfig,
    pub(crate) next_sync_ms: u64,
    pub(crate) next_drain_ms: u64,
    observers: Vec<Box<dyn BoardObserver + Send>>,
    origin: Instant,
}

impl Driver<SerialPortLink> {
    /// Driver for the serial device named in `config`
    pub fn from_config(config: &DriverConfig) -> Result<Self> {
        config.validate()?;
        let link = SerialPortLink::new(config.device.clone(), config.link_config());
        Self::new(link, config.board)
    }
}

impl<L: SerialLink> Driver<L> {
    /// Create a driver; nothing is opened until [`Driver::connect`]
    pub fn new(link: L, config: BoardConfig) -> Result<Self> {
        let board = Board::new(&config)?;
        Ok(Self {
            board: BoardHandle::new(board),
            link,
            parser: FrameParser::new(),
            config,
            next_sync_ms: 0,
            next_drain_ms: 0,
            observers: Vec::new(),
            origin: Instant::now(),
        })
    }

    /// Handle for reading and updating board state from any thread
    pub fn handle(&self) -> BoardHandle {
        self.board.clone()
    }

    /// Register an observer; notifications are delivered in registration order
    pub fn subscribe(&mut self, observer: impl BoardObserver + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Milliseconds since the driver was created
    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Start connecting; reconnects automatically until [`Driver::disconnect`]
    pub fn connect(&mut self, now_ms: u64) {
        info!("Connecting to servo board {}", self.board.id().get());
        let effects = self.board.with(|board| board.connect(now_ms));
        self.apply(effects);
    }

    /// Close the link and stop reconnecting
    pub fn disconnect(&mut self) {
        info!("Disconnecting from servo board");
        let effects = self.board.with(|board| board.disconnect());
        self.apply(effects);
    }

    /// Run every task that is due and return when to poll next
    pub fn poll(&mut self, now_ms: u64) -> u64 {
        tasks::link::poll_deadline(self, now_ms);
        tasks::link::receive(self, now_ms);
        tasks::sync::tick(self, now_ms);
        tasks::drain::drain(self, now_ms);
        self.next_wake(now_ms)
    }

    /// Poll until `stop` is set, sleeping between deadlines
    pub fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            let now = self.now_ms();
            let wake = self.poll(now);
            let now = self.now_ms();
            if wake > now {
                thread::sleep(Duration::from_millis(wake - now));
            }
        }
        debug!("Run loop stopped");
    }

    fn next_wake(&self, now_ms: u64) -> u64 {
        let deadline = self.board.with(|board| board.next_deadline());
        [
            Some(self.next_sync_ms),
            Some(self.next_drain_ms),
            deadline,
            Some(now_ms + RX_POLL_INTERVAL_MS),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(now_ms)
    }

    /// Apply effects in order; effects produced while applying one run
    /// before the rest
    pub(crate) fn apply(&mut self, effects: Effects) {
        let mut pending: VecDeque<Effect> = effects.into_iter().collect();

        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::OpenLink => {
                    self.parser.reset();
                    let follow_up = match self.link.open() {
                        Ok(()) => {
                            info!("Link open, waiting for READY");
                            self.board.with(|board| board.link_opened())
                        }
                        Err(e) => {
                            warn!("Failed to open link: {:?}", e);
                            self.board.with(|board| board.link_open_failed())
                        }
                    };
                    for effect in follow_up.into_iter().collect::<Vec<_>>().into_iter().rev() {
                        pending.push_front(effect);
                    }
                }
                Effect::CloseLink => {
                    self.link.close();
                    self.parser.reset();
                }
                Effect::Notify(notification) => self.notify(&notification),
            }
        }
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::Connect => info!("Servo board ready"),
            Notification::Disconnect => info!("Servo board disconnected"),
            Notification::Error(code) => warn!("Servo board error {}: {}", code.name(), code),
            Notification::Info(message) => {
                debug!("INFO: {}", String::from_utf8_lossy(message))
            }
            Notification::Debug(message) => {
                debug!("DEBUG: {}", String::from_utf8_lossy(message))
            }
            Notification::Sent(_) => {}
        }

        for observer in &mut self.observers {
            observer.on_notification(notification);
        }
    }
}
