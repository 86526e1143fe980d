//! De-duplicating instruction queue
//!
//! FIFO of encoded-ready frames. At most one frame per header byte (board id
//! + opcode) is pending at any time: enqueueing removes older frames with the
//! same header before appending, so a newer goal vector always supersedes an
//! unsent one.

use heapless::Deque;
use servoboard_protocol::Frame;

/// Maximum number of pending frames
///
/// With de-duplication a single board id can have at most six pending frames
/// (one per input opcode). The bound only comes into play after repeated id
/// changes leave frames for old ids behind.
pub const QUEUE_CAPACITY: usize = 16;

/// Pending outbound frames, oldest first
#[derive(Debug, Clone, Default)]
pub struct InstructionQueue {
    frames: Deque<Frame, QUEUE_CAPACITY>,
}

impl InstructionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame, replacing any pending frame with the same header
    ///
    /// If the queue is full the oldest frame is dropped and returned.
    pub fn enqueue(&mut self, frame: Frame) -> Option<Frame> {
        self.remove_header(frame.header());

        let dropped = if self.frames.is_full() {
            self.frames.pop_front()
        } else {
            None
        };
        // Room was made above
        let _ = self.frames.push_back(frame);
        dropped
    }

    /// Remove the oldest frame
    pub fn dequeue(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Put a frame whose write failed back at the head
    ///
    /// Skipped (returns `false`) when a newer frame with the same header is
    /// already pending, or when the queue has filled up in the meantime.
    pub fn requeue_front(&mut self, frame: Frame) -> bool {
        if self.contains_header(frame.header()) {
            return false;
        }
        self.frames.push_front(frame).is_ok()
    }

    /// Remove every pending frame with this header, returning how many went
    pub fn remove_header(&mut self, header: u8) -> usize {
        let before = self.frames.len();
        for _ in 0..before {
            if let Some(frame) = self.frames.pop_front() {
                if frame.header() != header {
                    // Capacity is unchanged by rotating
                    let _ = self.frames.push_back(frame);
                }
            }
        }
        before - self.frames.len()
    }

    /// True if a frame with this header is pending
    pub fn contains_header(&self, header: u8) -> bool {
        self.frames.iter().any(|f| f.header() == header)
    }

    /// Next frame to be sent, without removing it
    pub fn front(&self) -> Option<&Frame> {
        self.frames.front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use servoboard_protocol::{BoardId, InputOpcode};

    fn frame(id: u8, op: InputOpcode, byte: u8) -> Frame {
        let id = BoardId::new(id).unwrap();
        match op {
            InputOpcode::DebugEnable | InputOpcode::DebugDisable => {
                Frame::new(id, op.code(), &[]).unwrap()
            }
            _ => Frame::new(id, op.code(), &[byte]).unwrap(),
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = InstructionQueue::new();
        queue.enqueue(frame(0, InputOpcode::ServosGoal, 1));
        queue.enqueue(frame(0, InputOpcode::ServosEnabled, 2));

        assert_eq!(queue.dequeue().unwrap().opcode(), InputOpcode::ServosGoal.code());
        assert_eq!(queue.dequeue().unwrap().opcode(), InputOpcode::ServosEnabled.code());
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_dedup_moves_newest_to_tail() {
        let mut queue = InstructionQueue::new();
        queue.enqueue(frame(0, InputOpcode::ServosGoal, 1));
        queue.enqueue(frame(0, InputOpcode::ServosEnabled, 2));
        queue.enqueue(frame(0, InputOpcode::ServosGoal, 3));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dequeue().unwrap().opcode(), InputOpcode::ServosEnabled.code());
        assert_eq!(queue.dequeue().unwrap().payload(), &[3]);
    }

    #[test]
    fn test_same_opcode_different_id_kept() {
        let mut queue = InstructionQueue::new();
        queue.enqueue(frame(0, InputOpcode::ServosEnabled, 1));
        queue.enqueue(frame(1, InputOpcode::ServosEnabled, 1));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut queue = InstructionQueue::new();
        for id in 0..=15u8 {
            assert!(queue.enqueue(frame(id, InputOpcode::ServosEnabled, id)).is_none());
        }
        let dropped = queue.enqueue(frame(0, InputOpcode::ServosGoal, 9)).unwrap();
        assert_eq!(dropped.board_id(), 0);
        assert_eq!(dropped.opcode(), InputOpcode::ServosEnabled.code());
        assert_eq!(queue.len(), QUEUE_CAPACITY);
    }

    #[test]
    fn test_requeue_front() {
        let mut queue = InstructionQueue::new();
        queue.enqueue(frame(0, InputOpcode::ServosGoal, 1));
        queue.enqueue(frame(0, InputOpcode::ServosEnabled, 2));

        let head = queue.dequeue().unwrap();
        assert!(queue.requeue_front(head.clone()));
        assert_eq!(queue.front(), Some(&head));
    }

    #[test]
    fn test_requeue_skipped_when_superseded() {
        let mut queue = InstructionQueue::new();
        queue.enqueue(frame(0, InputOpcode::ServosGoal, 1));
        let stale = queue.dequeue().unwrap();
        queue.enqueue(frame(0, InputOpcode::ServosGoal, 2));

        assert!(!queue.requeue_front(stale));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.front().unwrap().payload(), &[2]);
    }

    #[test]
    fn test_remove_header() {
        let mut queue = InstructionQueue::new();
        let goal = frame(0, InputOpcode::ServosGoal, 1);
        queue.enqueue(goal.clone());
        queue.enqueue(frame(0, InputOpcode::DebugEnable, 0));

        assert_eq!(queue.remove_header(goal.header()), 1);
        assert!(!queue.contains_header(goal.header()));
        assert_eq!(queue.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_frame_per_header(
            ops in proptest::collection::vec((0u8..4, 2u8..=5, any::<u8>()), 0..64)
        ) {
            let mut queue = InstructionQueue::new();
            for (id, op, byte) in ops {
                let op = InputOpcode::from_code(op).unwrap();
                queue.enqueue(frame(id, op, byte));
            }

            let headers: heapless::Vec<u8, QUEUE_CAPACITY> =
                queue.iter().map(|f| f.header()).collect();
            for (i, h) in headers.iter().enumerate() {
                prop_assert!(!headers[i + 1..].contains(h));
            }
        }
    }
}
