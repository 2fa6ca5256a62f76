//! Media-poll routine
//!
//! Ties the packet codec, the statistics counters, and the playout buffer
//! together: one inbound datagram per tick is decoded, counted, and queued
//! for display. Malformed datagrams are recovered locally — the tick is
//! skipped and the counters do not advance.

use crate::buffer::PlayoutBuffer;
use crate::packet::{MediaPacket, PacketError};
use crate::stats::StatsHandle;
use bytes::Bytes;

/// Per-session media receiver
///
/// Writes the shared statistics counters; the feedback routine and display
/// path read them through the same handle.
pub struct StreamReceiver {
    stats: StatsHandle,
    playout: PlayoutBuffer,
}

impl StreamReceiver {
    /// Create a receiver over the session's statistics handle
    pub fn new(stats: StatsHandle) -> Self {
        StreamReceiver {
            stats,
            playout: PlayoutBuffer::new(),
        }
    }

    /// Process one inbound media datagram
    ///
    /// On success the frame is queued for display. On a malformed datagram
    /// the error is returned and nothing is recorded; the caller treats the
    /// tick as a no-op.
    pub fn handle_datagram(&mut self, datagram: &[u8]) -> Result<(), PacketError> {
        let packet = MediaPacket::from_bytes(datagram)?;
        let seq = packet.sequence();

        tracing::trace!(
            seq = %seq,
            timestamp = packet.timestamp(),
            payload_type = packet.payload_type(),
            len = packet.payload.len(),
            "media packet"
        );

        self.stats.write().record_packet(seq, packet.payload.len());
        self.playout.push(packet.payload, seq);
        Ok(())
    }

    /// Dequeue the next displayable frame, if any
    pub fn next_frame(&mut self) -> Option<Bytes> {
        self.playout.pop()
    }

    /// Number of frames currently queued for display
    pub fn pending_frames(&self) -> usize {
        self.playout.len()
    }
}
