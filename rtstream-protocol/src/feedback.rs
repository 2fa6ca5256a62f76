//! Feedback-Report Codec and Interval Accumulator
//!
//! Reception-quality reports are sent back to the sender on a fixed period.
//! Each report carries the loss fraction for the interval since the previous
//! report, the cumulative loss count, and the highest sequence number
//! observed. The accumulator owns the carried-forward baselines; they
//! advance after every computation whether or not the report was actually
//! transmitted (best-effort delivery, no retry).

use crate::stats::SessionStats;
use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

/// Size of a feedback report on the wire, in bytes
pub const REPORT_SIZE: usize = 16;

/// Packet-type code identifying a feedback (receiver) report
pub const REPORT_PACKET_TYPE: u8 = 201;

/// First header byte: protocol version 2, no padding, zero report count
const REPORT_HEADER_BYTE: u8 = 0x80;

/// Report body length in 32-bit words, minus one (header convention)
const REPORT_LENGTH_WORDS: u16 = 3;

/// Feedback packet parsing errors
#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Not a feedback report (packet type {0})")]
    WrongPacketType(u8),

    #[error("Unsupported report header byte: {0:#04x}")]
    BadHeader(u8),
}

/// One reception-quality report
///
/// Built and sent once per reporting tick; stateless between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackReport {
    /// Fraction of packets lost in the reporting interval, in [0, 1]
    pub fraction_lost: f32,
    /// Cumulative packets lost since session start
    pub cumulative_lost: u32,
    /// Highest sequence number observed since session start
    pub highest_seq: u32,
}

impl FeedbackReport {
    /// Serialize the report to its fixed wire format
    ///
    /// The loss fraction is carried as raw IEEE-754 bits so the encode/decode
    /// round trip is exact.
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(REPORT_SIZE);
        buf.put_u8(REPORT_HEADER_BYTE);
        buf.put_u8(REPORT_PACKET_TYPE);
        buf.put_u16(REPORT_LENGTH_WORDS);
        buf.put_u32(self.fraction_lost.to_bits());
        buf.put_u32(self.cumulative_lost);
        buf.put_u32(self.highest_seq);
        buf
    }

    /// Parse a report from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FeedbackError> {
        if bytes.len() < REPORT_SIZE {
            return Err(FeedbackError::InsufficientData {
                expected: REPORT_SIZE,
                actual: bytes.len(),
            });
        }

        let mut buf = &bytes[..REPORT_SIZE];
        let b0 = buf.get_u8();
        if b0 != REPORT_HEADER_BYTE {
            return Err(FeedbackError::BadHeader(b0));
        }
        let packet_type = buf.get_u8();
        if packet_type != REPORT_PACKET_TYPE {
            return Err(FeedbackError::WrongPacketType(packet_type));
        }
        let _length = buf.get_u16();

        Ok(FeedbackReport {
            fraction_lost: f32::from_bits(buf.get_u32()),
            cumulative_lost: buf.get_u32(),
            highest_seq: buf.get_u32(),
        })
    }
}

/// Interval accumulator for feedback reports
///
/// Carries the baselines between reporting ticks. The interval loss fraction
/// is recomputed each tick from the deltas of the received and lost counters
/// since the previous tick, never from session-lifetime totals.
#[derive(Debug, Default)]
pub struct FeedbackAccumulator {
    /// Received-packet counter at the previous tick
    last_received: u64,
    /// Cumulative lost counter at the previous tick
    last_lost: u64,
}

impl FeedbackAccumulator {
    /// Create an accumulator with zeroed baselines
    pub fn new() -> Self {
        FeedbackAccumulator::default()
    }

    /// Build the report for the interval ending now and advance the baselines
    pub fn build_report(&mut self, stats: &SessionStats) -> FeedbackReport {
        let received = stats.packets_received;
        let lost = stats.lost_packets();

        let expected_interval = received.saturating_sub(self.last_received);
        // A late-arriving packet can shrink the cumulative count below the
        // previous baseline; that interval simply reports no loss.
        let lost_interval = lost.saturating_sub(self.last_lost);

        // A quiet interval legitimately expects zero packets.
        let fraction_lost = if expected_interval == 0 {
            0.0
        } else {
            (lost_interval as f32 / expected_interval as f32).clamp(0.0, 1.0)
        };

        self.last_received = received;
        self.last_lost = lost;

        FeedbackReport {
            fraction_lost,
            cumulative_lost: lost as u32,
            highest_seq: stats.highest_seq as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SeqNumber;

    #[test]
    fn test_report_roundtrip() {
        let report = FeedbackReport {
            fraction_lost: 0.125,
            cumulative_lost: 42,
            highest_seq: 9001,
        };

        let bytes = report.to_bytes();
        assert_eq!(bytes.len(), REPORT_SIZE);

        let decoded = FeedbackReport::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn test_short_report_rejected() {
        let err = FeedbackReport::from_bytes(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, FeedbackError::InsufficientData { .. }));
    }

    #[test]
    fn test_wrong_packet_type_rejected() {
        let mut bytes = FeedbackReport {
            fraction_lost: 0.0,
            cumulative_lost: 0,
            highest_seq: 0,
        }
        .to_bytes();
        bytes[1] = 200;

        let err = FeedbackReport::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, FeedbackError::WrongPacketType(200)));
    }

    #[test]
    fn test_quiet_interval_reports_zero() {
        let stats = SessionStats::new();
        let mut acc = FeedbackAccumulator::new();

        let report = acc.build_report(&stats);
        assert_eq!(report.fraction_lost, 0.0);
        assert_eq!(report.cumulative_lost, 0);
    }

    #[test]
    fn test_interval_fraction_uses_deltas() {
        let mut stats = SessionStats::new();
        let mut acc = FeedbackAccumulator::new();

        for seq in [1u16, 2, 3, 5, 6, 7, 8, 9, 10, 11] {
            stats.record_packet(SeqNumber::new(seq), 10);
        }

        let report = acc.build_report(&stats);
        assert!((report.fraction_lost - 0.1).abs() < 1e-6);
        assert_eq!(report.cumulative_lost, 1);
        assert_eq!(report.highest_seq, 11);

        // Next interval is clean; the fraction must not inherit the old loss.
        for seq in 12u16..=21 {
            stats.record_packet(SeqNumber::new(seq), 10);
        }
        let report = acc.build_report(&stats);
        assert_eq!(report.fraction_lost, 0.0);
        assert_eq!(report.cumulative_lost, 1);
    }

    #[test]
    fn test_baselines_advance_even_on_quiet_tick() {
        let mut stats = SessionStats::new();
        let mut acc = FeedbackAccumulator::new();

        stats.record_packet(SeqNumber::new(1), 10);
        stats.record_packet(SeqNumber::new(3), 10);
        let _ = acc.build_report(&stats);

        // No traffic between ticks: expected interval is zero.
        let report = acc.build_report(&stats);
        assert_eq!(report.fraction_lost, 0.0);
    }

    #[test]
    fn test_fraction_bounded() {
        let mut stats = SessionStats::new();
        let mut acc = FeedbackAccumulator::new();

        // Two packets received with a huge gap between them: the interval
        // loss count exceeds the interval received count.
        stats.record_packet(SeqNumber::new(1), 10);
        stats.record_packet(SeqNumber::new(1000), 10);

        let report = acc.build_report(&stats);
        assert!(report.fraction_lost >= 0.0 && report.fraction_lost <= 1.0);
    }
}
