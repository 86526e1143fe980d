//! Board aggregate
//!
//! One `Board` per physical servo board: its id, the 16 servos, the pending
//! instruction queue, the sync snapshot and the link state machine. Every
//! operation is synchronous and returns the effects the runtime must apply.

use heapless::Vec;
use servoboard_protocol::{
    BoardId, ErrorCode, Frame, FrameError, InboundFrame, Instruction, OutputOpcode, RawFrame,
    Response, SERVO_COUNT,
};

use crate::config::{BoardConfig, ConfigError};
use crate::effect::{extend, push, Effect, Effects};
use crate::error::UsageError;
use crate::link::{Link, LinkState, ReadyOutcome};
use crate::queue::InstructionQueue;
use crate::servo::state::servo_bank;
use crate::servo::Servo;
use crate::sync::{reconcile, SentSnapshot};
use crate::traits::Notification;

/// Frames dropped from a full queue during one operation
pub type Dropped = Vec<Frame, 3>;

/// What happened to an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameDisposition {
    /// Processed
    Handled(OutputOpcode),
    /// Addressed from another board id; dropped silently
    ForeignId(u8),
    /// Valid, but the link is not ready for it
    NotReady(OutputOpcode),
    /// Malformed; RESPONSE_ILLEGAL was raised
    Rejected(FrameError),
    /// Malformed and arrived before READY; dropped silently
    Discarded(FrameError),
}

/// Host-side model of one servo board
#[derive(Debug, Clone)]
pub struct Board {
    id: BoardId,
    servos: [Servo; SERVO_COUNT],
    queue: InstructionQueue,
    snapshot: SentSnapshot,
    link: Link,
}

impl Board {
    /// Create a board from validated configuration
    pub fn new(config: &BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let id = BoardId::new(config.id).map_err(|_| ConfigError::InvalidBoardId(config.id))?;

        Ok(Self {
            id,
            servos: servo_bank(),
            queue: InstructionQueue::new(),
            snapshot: SentSnapshot::empty(),
            link: Link::new(config.reconnect_delay_ms),
        })
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    /// Reassign the board id
    ///
    /// SET_ID goes out addressed to the current id with the new id as its
    /// payload; every frame enqueued afterwards uses the new id.
    pub fn set_id(&mut self, new_id: u8) -> Result<Option<Frame>, UsageError> {
        let new_id = BoardId::new(new_id)?;
        let dropped = self.enqueue(Instruction::SetId(new_id))?;
        self.id = new_id;
        Ok(dropped)
    }

    /// Ask the board to start sending DEBUG messages
    pub fn debug_enable(&mut self) -> Result<Option<Frame>, UsageError> {
        self.enqueue(Instruction::DebugEnable)
    }

    /// Ask the board to stop sending DEBUG messages
    pub fn debug_disable(&mut self) -> Result<Option<Frame>, UsageError> {
        self.enqueue(Instruction::DebugDisable)
    }

    /// Frame and enqueue an instruction for this board
    ///
    /// Returns the frame dropped to make room, if the queue was full.
    pub fn enqueue(&mut self, instruction: Instruction) -> Result<Option<Frame>, UsageError> {
        let frame = instruction.to_frame(self.id)?;
        Ok(self.queue.enqueue(frame))
    }

    pub fn servos(&self) -> &[Servo; SERVO_COUNT] {
        &self.servos
    }

    pub fn servo(&self, index: usize) -> Result<&Servo, UsageError> {
        self.servos.get(index).ok_or(UsageError::InvalidServoIndex(index))
    }

    pub fn servo_mut(&mut self, index: usize) -> Result<&mut Servo, UsageError> {
        self.servos
            .get_mut(index)
            .ok_or(UsageError::InvalidServoIndex(index))
    }

    pub fn set_goal(&mut self, index: usize, goal: f32) -> Result<(), UsageError> {
        self.servo_mut(index)?.set_goal(goal);
        Ok(())
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), UsageError> {
        self.servo_mut(index)?.set_enabled(enabled);
        Ok(())
    }

    pub fn calibrate(&mut self, index: usize) -> Result<(), UsageError> {
        self.servo_mut(index)?.calibrate();
        Ok(())
    }

    pub fn queue(&self) -> &InstructionQueue {
        &self.queue
    }

    pub fn snapshot(&self) -> &SentSnapshot {
        &self.snapshot
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    pub fn is_ready(&self) -> bool {
        self.link.is_ready()
    }

    /// Reconcile desired state into queued instructions
    ///
    /// The snapshot is replaced only after the whole plan has been enqueued.
    pub fn sync_tick(&mut self) -> Dropped {
        let plan = reconcile(&mut self.servos, &self.snapshot);
        let mut dropped = Dropped::new();

        let enabled = plan.enabled.map(|mask| {
            let instruction = Instruction::ServosEnabled(mask);
            // Servos 8-15 were or are enabled: send the high byte so they clear
            if (mask | self.snapshot.enabled) > 0xFF {
                instruction.to_wide_frame(self.id)
            } else {
                instruction.to_frame(self.id)
            }
        });
        let frames = [
            plan.goals.map(|goals| Instruction::ServosGoal(goals).to_frame(self.id)),
            enabled,
            plan.calibrate.map(|mask| Instruction::ServosCalibrate(mask).to_frame(self.id)),
        ];
        for frame in frames.into_iter().flatten() {
            match frame {
                Ok(frame) => {
                    if let Some(old) = self.queue.enqueue(frame) {
                        let _ = dropped.push(old);
                    }
                }
                // Goals are mapped to 0-254 and masks always fit
                Err(_) => continue,
            }
        }

        self.snapshot = plan.next;
        dropped
    }

    /// Take the next frame to write, if the link is ready
    pub fn next_frame(&mut self) -> Option<Frame> {
        if !self.link.is_ready() {
            return None;
        }
        self.queue.dequeue()
    }

    /// A frame was written successfully
    pub fn frame_sent(&mut self, frame: Frame) -> Effects {
        let mut effects = Effects::new();
        push(&mut effects, Effect::Notify(Notification::Sent(frame)));
        effects
    }

    /// Writing `frame` failed: keep it for the next link and treat the
    /// failure as a transport error
    pub fn write_failed(&mut self, frame: Frame, now_ms: u64) -> Effects {
        self.queue.requeue_front(frame);
        self.link.link_error(now_ms)
    }

    /// Process one chunk from the inbound stream
    pub fn handle_frame(&mut self, raw: &RawFrame) -> (FrameDisposition, Effects) {
        let mut effects = Effects::new();

        if raw.board_id() != self.id.get() {
            return (FrameDisposition::ForeignId(raw.board_id()), effects);
        }

        let response = match InboundFrame::try_from(raw).and_then(|f| Response::from_frame(&f)) {
            Ok(response) => response,
            // Line noise while the board boots is not an illegal response
            Err(err) if !self.link.is_ready() => {
                return (FrameDisposition::Discarded(err), effects);
            }
            Err(err) => {
                push(
                    &mut effects,
                    Effect::Notify(Notification::Error(ErrorCode::ResponseIllegal)),
                );
                return (FrameDisposition::Rejected(err), effects);
            }
        };
        let opcode = response.opcode();

        if response == Response::Ready {
            let (outcome, link_effects) = self.link.ready_received();
            extend(&mut effects, link_effects);
            return match outcome {
                ReadyOutcome::Connected | ReadyOutcome::Refreshed => {
                    self.snapshot = SentSnapshot::empty();
                    (FrameDisposition::Handled(opcode), effects)
                }
                ReadyOutcome::Ignored => (FrameDisposition::NotReady(opcode), effects),
            };
        }

        if !self.link.is_ready() {
            return (FrameDisposition::NotReady(opcode), effects);
        }

        match response {
            Response::Info(message) => {
                push(&mut effects, Effect::Notify(Notification::Info(message)));
            }
            Response::Debug(message) => {
                push(&mut effects, Effect::Notify(Notification::Debug(message)));
            }
            Response::Error(code) => {
                push(&mut effects, Effect::Notify(Notification::Error(code)));
            }
            Response::AllServosPosition(values) => {
                for (servo, byte) in self.servos.iter_mut().zip(values) {
                    servo.set_position_raw(byte);
                }
            }
            Response::AllServosLoad(values) => {
                for (servo, byte) in self.servos.iter_mut().zip(values) {
                    servo.set_load_raw(byte);
                }
            }
            Response::Ready => {}
        }
        (FrameDisposition::Handled(opcode), effects)
    }

    /// Start connecting; see [`Link::connect`]
    pub fn connect(&mut self, now_ms: u64) -> Effects {
        self.link.connect(now_ms)
    }

    /// Stop and close; see [`Link::disconnect`]
    pub fn disconnect(&mut self) -> Effects {
        self.link.disconnect()
    }

    pub fn link_opened(&mut self) -> Effects {
        self.link.link_opened()
    }

    pub fn link_open_failed(&mut self) -> Effects {
        self.link.link_open_failed()
    }

    pub fn link_closed(&mut self, now_ms: u64) -> Effects {
        self.link.link_closed(now_ms)
    }

    pub fn link_error(&mut self, now_ms: u64) -> Effects {
        self.link.link_error(now_ms)
    }

    /// Check reconnect and handshake deadlines
    pub fn poll(&mut self, now_ms: u64) -> Effects {
        self.link.poll(now_ms)
    }

    /// Earliest time `poll` has work to do
    pub fn next_deadline(&self) -> Option<u64> {
        self.link.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servoboard_protocol::{FrameParser, InputOpcode, TERMINATOR};

    fn board() -> Board {
        Board::new(&BoardConfig::default()).unwrap()
    }

    fn raw(bytes: &[u8]) -> RawFrame {
        let mut parser = FrameParser::new();
        bytes
            .iter()
            .chain(core::iter::once(&TERMINATOR))
            .find_map(|&b| parser.feed(b))
            .unwrap()
    }

    fn response(id: u8, response: Response) -> RawFrame {
        let frame = response.to_frame(BoardId::new(id).unwrap());
        let bytes = frame.encode_to_vec();
        raw(&bytes[..bytes.len() - 1])
    }

    fn ready_board() -> Board {
        let mut board = board();
        board.connect(0);
        board.link_opened();
        board.handle_frame(&response(0, Response::Ready));
        board
    }

    fn notified(effects: &Effects, notification: Notification) -> bool {
        effects.iter().any(|e| *e == Effect::Notify(notification.clone()))
    }

    #[test]
    fn test_goal_frame_after_ready() {
        let mut board = ready_board();
        board.set_goal(4, 0.5).unwrap();
        board.sync_tick();

        let frame = board.next_frame().unwrap();
        let bytes = frame.encode_to_vec().unwrap();
        assert_eq!(bytes.len(), 18);
        assert_eq!(bytes[0], 0x03);
        assert_eq!(bytes[5], 127);
        assert!(bytes[1..17]
            .iter()
            .enumerate()
            .all(|(i, &b)| i == 4 || b == 0));
        assert_eq!(bytes[17], TERMINATOR);
    }

    #[test]
    fn test_goal_frame_for_board_2_servo_5() {
        let mut board = Board::new(&BoardConfig {
            id: 2,
            ..Default::default()
        })
        .unwrap();
        board.set_goal(5, 0.5).unwrap();
        board.sync_tick();

        let bytes = board.queue().front().unwrap().encode_to_vec().unwrap();
        assert_eq!(bytes[0], (2 << 4) | 3);
        assert_eq!(bytes[6], 127);
        assert_eq!(bytes.iter().filter(|&&b| b == 0).count(), 15);
        assert_eq!(bytes[17], TERMINATOR);

        // Unchanged goal is not queued again
        board.sync_tick();
        assert_eq!(board.queue().len(), 1);
    }

    #[test]
    fn test_calibrate_servo_3_mask() {
        let mut board = board();
        board.sync_tick();
        board.calibrate(3).unwrap();
        board.sync_tick();

        let frame = board
            .queue()
            .iter()
            .find(|f| f.opcode() == InputOpcode::ServosCalibrate.code())
            .unwrap();
        assert_eq!(frame.payload(), &[0b1000]);
        assert!(!board.servo(3).unwrap().calibrate_requested());
    }

    #[test]
    fn test_enable_mask_single_byte() {
        let mut board = ready_board();
        board.sync_tick();
        board.next_frame();

        board.set_enabled(0, true).unwrap();
        board.set_enabled(2, true).unwrap();
        board.sync_tick();

        let frame = board.next_frame().unwrap();
        assert_eq!(frame.encode_to_vec().unwrap().as_slice(), &[0x04, 0x05, 0xFF]);
    }

    #[test]
    fn test_disabling_high_servo_sends_both_mask_bytes() {
        let mut board = ready_board();
        board.sync_tick();
        board.next_frame();

        board.set_enabled(9, true).unwrap();
        board.sync_tick();
        let frame = board.next_frame().unwrap();
        assert_eq!(frame.payload(), &[0x00, 0x02]);

        board.set_enabled(9, false).unwrap();
        board.sync_tick();
        let frame = board.next_frame().unwrap();
        assert_eq!(frame.encode_to_vec().unwrap().as_slice(), &[0x04, 0x00, 0x00, 0xFF]);

        // Once cleared, low-only masks go back to one byte
        board.set_enabled(1, true).unwrap();
        board.sync_tick();
        let frame = board.next_frame().unwrap();
        assert_eq!(frame.payload(), &[0x02]);
    }

    #[test]
    fn test_idle_tick_enqueues_nothing() {
        let mut board = ready_board();
        board.sync_tick();
        while board.next_frame().is_some() {}

        board.sync_tick();
        assert!(board.queue().is_empty());
    }

    #[test]
    fn test_calibrate_sent_once() {
        let mut board = ready_board();
        board.sync_tick();
        board.next_frame();

        board.calibrate(9).unwrap();
        board.sync_tick();
        let frame = board.next_frame().unwrap();
        assert_eq!(frame.opcode(), InputOpcode::ServosCalibrate.code());
        assert_eq!(frame.payload(), &[0x00, 0x02]);

        board.sync_tick();
        assert!(board.queue().is_empty());
    }

    #[test]
    fn test_nothing_sent_until_ready() {
        let mut board = board();
        board.sync_tick();
        assert_eq!(board.queue().len(), 1);
        assert!(board.next_frame().is_none());
    }

    #[test]
    fn test_ready_connects_and_resets_snapshot() {
        let mut board = board();
        board.sync_tick();
        assert!(board.snapshot().goals.is_some());

        board.connect(0);
        board.link_opened();
        let (disposition, effects) = board.handle_frame(&response(0, Response::Ready));

        assert_eq!(disposition, FrameDisposition::Handled(OutputOpcode::Ready));
        assert!(notified(&effects, Notification::Connect));
        assert!(board.is_ready());
        assert_eq!(*board.snapshot(), SentSnapshot::empty());
    }

    #[test]
    fn test_repeated_ready_resends_state() {
        let mut board = ready_board();
        board.sync_tick();
        while board.next_frame().is_some() {}

        let (_, effects) = board.handle_frame(&response(0, Response::Ready));
        assert!(!notified(&effects, Notification::Connect));

        board.sync_tick();
        assert_eq!(board.queue().len(), 1);
    }

    #[test]
    fn test_foreign_id_ignored() {
        let mut board = ready_board();
        let (disposition, effects) = board.handle_frame(&response(3, Response::Info([1; 16])));
        assert_eq!(disposition, FrameDisposition::ForeignId(3));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_short_frame_is_illegal_response() {
        let mut board = ready_board();
        let (disposition, effects) = board.handle_frame(&raw(&[0x01, 1, 2, 3]));

        assert_eq!(disposition, FrameDisposition::Rejected(FrameError::WrongLength(3)));
        assert!(notified(&effects, Notification::Error(ErrorCode::ResponseIllegal)));
    }

    #[test]
    fn test_unknown_opcode_is_illegal_response() {
        let mut board = ready_board();
        let mut bytes = [0u8; 17];
        bytes[0] = 0x0A;
        let (disposition, effects) = board.handle_frame(&raw(&bytes));

        assert_eq!(disposition, FrameDisposition::Rejected(FrameError::UnknownOpcode(0x0A)));
        assert!(notified(&effects, Notification::Error(ErrorCode::ResponseIllegal)));
    }

    #[test]
    fn test_only_ready_processed_before_handshake() {
        let mut board = board();
        board.connect(0);
        board.link_opened();

        let (disposition, effects) = board.handle_frame(&response(0, Response::Info([1; 16])));
        assert_eq!(disposition, FrameDisposition::NotReady(OutputOpcode::Info));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_malformed_frames_before_ready_are_dropped() {
        let mut board = board();
        board.connect(0);
        board.link_opened();

        let (disposition, effects) = board.handle_frame(&raw(&[0x01, 1, 2]));
        assert_eq!(disposition, FrameDisposition::Discarded(FrameError::WrongLength(2)));
        assert!(effects.is_empty());

        let mut bytes = [0u8; 17];
        bytes[0] = 0x0A;
        let (disposition, effects) = board.handle_frame(&raw(&bytes));
        assert_eq!(disposition, FrameDisposition::Discarded(FrameError::UnknownOpcode(0x0A)));
        assert!(effects.is_empty());

        // The handshake still completes afterwards
        let (disposition, effects) = board.handle_frame(&response(0, Response::Ready));
        assert_eq!(disposition, FrameDisposition::Handled(OutputOpcode::Ready));
        assert!(notified(&effects, Notification::Connect));
    }

    #[test]
    fn test_board_messages_forwarded() {
        let mut board = ready_board();
        let msg = *b"temperature okay";

        let (_, effects) = board.handle_frame(&response(0, Response::Info(msg)));
        assert!(notified(&effects, Notification::Info(msg)));

        let (_, effects) = board.handle_frame(&response(0, Response::Debug(msg)));
        assert!(notified(&effects, Notification::Debug(msg)));

        let (_, effects) =
            board.handle_frame(&response(0, Response::Error(ErrorCode::InstructionIllegal)));
        assert!(notified(&effects, Notification::Error(ErrorCode::InstructionIllegal)));
    }

    #[test]
    fn test_unknown_board_error_code() {
        let mut board = ready_board();
        let mut payload = [0u8; 17];
        payload[0] = 0x03;
        payload[1] = 0x42;
        let (_, effects) = board.handle_frame(&raw(&payload));
        assert!(notified(&effects, Notification::Error(ErrorCode::Unknown)));
    }

    #[test]
    fn test_telemetry_updates() {
        let mut board = ready_board();
        let mut positions = [0u8; 16];
        positions[3] = 254;
        let mut loads = [0u8; 16];
        loads[1] = 127;

        board.handle_frame(&response(0, Response::AllServosPosition(positions)));
        board.handle_frame(&response(0, Response::AllServosLoad(loads)));

        assert_eq!(board.servo(3).unwrap().position(), 1.0);
        assert_eq!(board.servo(0).unwrap().position(), 0.0);
        assert!((board.servo(1).unwrap().load() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_id_addressing() {
        let mut board = ready_board();
        board.set_id(9).unwrap();
        assert_eq!(board.id().get(), 9);

        let frame = board.next_frame().unwrap();
        assert_eq!(frame.encode_to_vec().unwrap().as_slice(), &[0x02, 0x09, 0xFF]);

        board.debug_enable().unwrap();
        assert_eq!(board.next_frame().unwrap().header(), 0x90);
    }

    #[test]
    fn test_invalid_arguments() {
        let mut board = board();
        assert_eq!(board.set_id(16), Err(UsageError::InvalidBoardId(16)));
        assert_eq!(board.id().get(), 0);
        assert_eq!(board.set_goal(16, 0.5), Err(UsageError::InvalidServoIndex(16)));
        assert!(board.servo(99).is_err());
    }

    #[test]
    fn test_write_failure_requeues() {
        let mut board = ready_board();
        board.sync_tick();
        let frame = board.next_frame().unwrap();

        let effects = board.write_failed(frame.clone(), 100);
        assert!(notified(&effects, Notification::Error(ErrorCode::NoConnection)));
        assert!(effects.contains(&Effect::OpenLink));
        assert_eq!(board.queue().front(), Some(&frame));
        assert_eq!(board.link_state(), LinkState::Connecting);
    }

    #[test]
    fn test_frame_sent_notifies() {
        let mut board = ready_board();
        board.sync_tick();
        let frame = board.next_frame().unwrap();
        let effects = board.frame_sent(frame.clone());
        assert!(notified(&effects, Notification::Sent(frame)));
    }
}
