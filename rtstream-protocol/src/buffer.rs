//! Playout buffer for frame synchronization
//!
//! Media datagrams arrive out of order or not at all, but the display wants
//! exactly one frame per output slot without ever blocking. The buffer fills
//! gaps by repeating the most recently shown frame, preserving real-time
//! pacing at the cost of occasionally re-displaying stale content.

use crate::sequence::SeqNumber;
use bytes::Bytes;
use std::collections::VecDeque;

/// Reorder/gap-fill queue keyed by sequence number
///
/// Created once per playback session and kept across pause/resume. The
/// expected output slot starts at 1 and only advances when a frame is
/// dequeued.
#[derive(Debug)]
pub struct PlayoutBuffer {
    /// Pending frames, one per output slot
    queue: VecDeque<Bytes>,
    /// Next output slot to be dequeued
    expected: SeqNumber,
    /// Most recently dequeued frame, repeated into gap slots
    last_frame: Option<Bytes>,
}

impl Default for PlayoutBuffer {
    fn default() -> Self {
        PlayoutBuffer::new()
    }
}

impl PlayoutBuffer {
    /// Create an empty buffer expecting sequence number 1
    pub fn new() -> Self {
        PlayoutBuffer {
            queue: VecDeque::new(),
            expected: SeqNumber::new(1),
            last_frame: None,
        }
    }

    /// Number of frames queued for output
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether any frame is ready for output
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The next output slot to be dequeued
    pub fn expected(&self) -> SeqNumber {
        self.expected
    }

    /// The slot the next arrival is expected to fill
    ///
    /// Slots already covered by queued frames are accounted for, so a burst
    /// of pushes before any pop fills each slot exactly once.
    fn next_slot(&self) -> SeqNumber {
        self.expected + self.queue.len() as u16
    }

    /// Frame used to fill a slot whose real frame is missing or stale
    ///
    /// Before anything has been dequeued there is no previous frame to
    /// repeat; the arriving frame stands in for it.
    fn filler(&self, arriving: &Bytes) -> Bytes {
        match &self.last_frame {
            Some(frame) => frame.clone(),
            None => arriving.clone(),
        }
    }

    /// Add an arriving frame under its sequence number
    ///
    /// A stale arrival (slot already output) enqueues one repeat of the last
    /// shown frame so the output cadence is preserved; an arrival beyond the
    /// next slot enqueues one repeat per missing slot first.
    pub fn push(&mut self, frame: Bytes, seq: SeqNumber) {
        let slot = self.next_slot();
        let distance = slot.distance_to(seq);

        if distance < 0 {
            tracing::debug!(seq = %seq, slot = %slot, "stale frame, repeating last output");
            let filler = self.filler(&frame);
            self.queue.push_back(filler);
        } else if distance > 0 {
            tracing::debug!(seq = %seq, slot = %slot, gap = distance, "gap detected, filling");
            let filler = self.filler(&frame);
            for _ in 0..distance {
                self.queue.push_back(filler.clone());
            }
            self.queue.push_back(frame);
        } else {
            self.queue.push_back(frame);
        }
    }

    /// Dequeue the next frame for display
    ///
    /// Advances the expected slot and remembers the returned frame as the
    /// gap filler. Returns `None` only when nothing is queued.
    pub fn pop(&mut self) -> Option<Bytes> {
        let frame = self.queue.pop_front()?;
        self.expected.increment();
        self.last_frame = Some(frame.clone());
        Some(frame)
    }
}
