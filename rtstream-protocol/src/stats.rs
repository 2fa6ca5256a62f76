//! Session reception statistics
//!
//! Raw counters are written by the media-poll routine and read by the
//! feedback-report routine and the display path. The counters live behind a
//! shared handle (`Arc<RwLock<SessionStats>>`) owned by the session, so there
//! is no hidden global state.

use crate::sequence::SeqNumber;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Shared handle to session statistics
pub type StatsHandle = Arc<RwLock<SessionStats>>;

/// Raw reception counters for one playback session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Total payload bytes received
    pub total_bytes: u64,
    /// Number of media packets received (the expected-packet counter)
    pub packets_received: u64,
    /// Extended highest sequence number observed (wraparound unrolled)
    pub highest_seq: u64,
    /// Raw 16-bit value behind `highest_seq`, for wraparound tracking
    last_highest_raw: Option<SeqNumber>,
    /// Accumulated playing time, paused intervals excluded
    play_time: Duration,
}

impl SessionStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        SessionStats::default()
    }

    /// Create a fresh shared handle
    pub fn new_handle() -> StatsHandle {
        Arc::new(RwLock::new(SessionStats::new()))
    }

    /// Record a successfully decoded media packet
    pub fn record_packet(&mut self, sequence: SeqNumber, payload_len: usize) {
        self.packets_received += 1;
        self.total_bytes += payload_len as u64;

        match self.last_highest_raw {
            None => {
                self.highest_seq = u64::from(sequence.as_raw());
                self.last_highest_raw = Some(sequence);
            }
            Some(raw) => {
                let advance = raw.distance_to(sequence);
                if advance > 0 {
                    self.highest_seq += advance as u64;
                    self.last_highest_raw = Some(sequence);
                }
            }
        }
    }

    /// Add elapsed playing time (used for the data-rate statistic)
    pub fn record_play_time(&mut self, elapsed: Duration) {
        self.play_time += elapsed;
    }

    /// Cumulative packets lost since session start
    ///
    /// Packets expected so far equal the highest sequence observed; whatever
    /// was not received is counted lost. Reordered packets that later arrive
    /// reduce this again.
    pub fn lost_packets(&self) -> u64 {
        self.highest_seq.saturating_sub(self.packets_received)
    }

    /// Derive a display-oriented snapshot from the raw counters
    pub fn snapshot(&self) -> StatsSnapshot {
        let lost = self.lost_packets();
        let fraction_lost = if self.highest_seq == 0 {
            0.0
        } else {
            (lost as f64 / self.highest_seq as f64).clamp(0.0, 1.0)
        };

        let secs = self.play_time.as_secs_f64();
        let data_rate_bps = if secs > 0.0 {
            self.total_bytes as f64 / secs
        } else {
            0.0
        };

        StatsSnapshot {
            total_bytes: self.total_bytes,
            packets_received: self.packets_received,
            highest_seq: self.highest_seq,
            lost_packets: lost,
            fraction_lost,
            data_rate_bps,
        }
    }
}

/// Display-oriented statistics derived from the raw counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    /// Total payload bytes received
    pub total_bytes: u64,
    /// Media packets received
    pub packets_received: u64,
    /// Extended highest sequence number observed
    pub highest_seq: u64,
    /// Cumulative packets lost
    pub lost_packets: u64,
    /// Session-lifetime loss ratio in [0, 1]
    pub fraction_lost: f64,
    /// Payload data rate in bytes per second
    pub data_rate_bps: f64,
}
