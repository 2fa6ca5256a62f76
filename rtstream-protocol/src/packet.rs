//! Media-Transport Packet Structures and Serialization
//!
//! This module implements the media-transport packet format: a fixed 12-byte
//! header followed by the frame payload. All multi-byte fields are network
//! byte order. The client is receive-only, but encoding is provided as the
//! exact inverse of decoding for protocol completeness and testing.

use crate::sequence::SeqNumber;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Size of the media packet header in bytes
pub const HEADER_SIZE: usize = 12;

/// Protocol version carried in the first header byte
pub const PROTOCOL_VERSION: u8 = 2;

/// Payload type for MJPEG video frames
pub const MJPEG_PAYLOAD_TYPE: u8 = 26;

/// Packet parsing and validation errors
#[derive(Error, Debug)]
pub enum PacketError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u8),
}

/// Media packet header (96 bits = 12 bytes)
///
/// Byte 0 packs version (2 bits), padding flag, extension flag, and the
/// contributor count (4 bits). Byte 1 packs the marker bit and the payload
/// type (7 bits). The remaining fields are big-endian integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Protocol version (2 bits)
    pub version: u8,
    /// Padding flag
    pub padding: bool,
    /// Extension flag
    pub extension: bool,
    /// Contributing source count (4 bits)
    pub contributor_count: u8,
    /// Marker bit
    pub marker: bool,
    /// Payload type code (7 bits)
    pub payload_type: u8,
    /// Sequence number (16-bit, wraps)
    pub sequence: SeqNumber,
    /// Presentation timestamp (sender clock)
    pub timestamp: u32,
    /// Synchronization source identifier
    pub ssrc: u32,
}

impl PacketHeader {
    /// Create a header for a fresh packet of the given payload type
    pub fn new(payload_type: u8, sequence: SeqNumber, timestamp: u32, ssrc: u32) -> Self {
        PacketHeader {
            version: PROTOCOL_VERSION,
            padding: false,
            extension: false,
            contributor_count: 0,
            marker: false,
            payload_type: payload_type & 0x7F,
            sequence,
            timestamp,
            ssrc,
        }
    }

    /// Parse a header from bytes (network byte order)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < HEADER_SIZE {
            return Err(PacketError::InsufficientData {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let mut buf = &bytes[..HEADER_SIZE];
        let b0 = buf.get_u8();
        let b1 = buf.get_u8();

        let version = b0 >> 6;
        if version != PROTOCOL_VERSION {
            return Err(PacketError::UnsupportedVersion(version));
        }

        Ok(PacketHeader {
            version,
            padding: (b0 & 0x20) != 0,
            extension: (b0 & 0x10) != 0,
            contributor_count: b0 & 0x0F,
            marker: (b1 & 0x80) != 0,
            payload_type: b1 & 0x7F,
            sequence: SeqNumber::new(buf.get_u16()),
            timestamp: buf.get_u32(),
            ssrc: buf.get_u32(),
        })
    }

    /// Serialize the header to bytes (network byte order)
    pub fn to_bytes(&self, buf: &mut BytesMut) {
        let mut b0 = (self.version & 0x03) << 6;
        if self.padding {
            b0 |= 0x20;
        }
        if self.extension {
            b0 |= 0x10;
        }
        b0 |= self.contributor_count & 0x0F;

        let mut b1 = self.payload_type & 0x7F;
        if self.marker {
            b1 |= 0x80;
        }

        buf.put_u8(b0);
        buf.put_u8(b1);
        buf.put_u16(self.sequence.as_raw());
        buf.put_u32(self.timestamp);
        buf.put_u32(self.ssrc);
    }
}

/// Media packet: fixed header plus frame payload
///
/// Constructed fresh from each inbound datagram and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPacket {
    /// Packet header
    pub header: PacketHeader,
    /// Frame payload bytes
    pub payload: Bytes,
}

impl MediaPacket {
    /// Create a new media packet
    pub fn new(header: PacketHeader, payload: Bytes) -> Self {
        MediaPacket { header, payload }
    }

    /// Get the sequence number
    #[inline]
    pub fn sequence(&self) -> SeqNumber {
        self.header.sequence
    }

    /// Get the payload type code
    #[inline]
    pub fn payload_type(&self) -> u8 {
        self.header.payload_type
    }

    /// Get the presentation timestamp
    #[inline]
    pub fn timestamp(&self) -> u32 {
        self.header.timestamp
    }

    /// Total size of the packet (header + payload)
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Parse a media packet from a received datagram
    ///
    /// Payload length is whatever follows the fixed header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        let header = PacketHeader::from_bytes(bytes)?;

        let payload = if bytes.len() > HEADER_SIZE {
            Bytes::copy_from_slice(&bytes[HEADER_SIZE..])
        } else {
            Bytes::new()
        };

        Ok(MediaPacket { header, payload })
    }

    /// Serialize the packet to bytes
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.size());
        self.header.to_bytes(&mut buf);
        buf.put_slice(&self.payload);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = PacketHeader::new(MJPEG_PAYLOAD_TYPE, SeqNumber::new(1000), 5000, 9999);

        let mut buf = BytesMut::new();
        header.to_bytes(&mut buf);
        let decoded = PacketHeader::from_bytes(&buf).unwrap();

        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_flag_bits_roundtrip() {
        let mut header = PacketHeader::new(96, SeqNumber::new(42), 123456, 0xDEAD_BEEF);
        header.padding = true;
        header.extension = true;
        header.marker = true;
        header.contributor_count = 7;

        let mut buf = BytesMut::new();
        header.to_bytes(&mut buf);
        let decoded = PacketHeader::from_bytes(&buf).unwrap();

        assert_eq!(decoded, header);
    }

    #[test]
    fn test_packet_roundtrip() {
        let header = PacketHeader::new(MJPEG_PAYLOAD_TYPE, SeqNumber::new(7), 100, 1);
        let payload = Bytes::from_static(b"frame bytes");

        let packet = MediaPacket::new(header, payload.clone());
        let bytes = packet.to_bytes();
        let decoded = MediaPacket::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.sequence(), SeqNumber::new(7));
        assert_eq!(decoded.payload_type(), MJPEG_PAYLOAD_TYPE);
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn test_short_datagram_rejected() {
        let err = MediaPacket::from_bytes(&[0u8; 5]).unwrap_err();
        assert!(matches!(
            err,
            PacketError::InsufficientData {
                expected: HEADER_SIZE,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = 0x40; // version 1
        let err = MediaPacket::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, PacketError::UnsupportedVersion(1)));
    }

    #[test]
    fn test_empty_payload() {
        let header = PacketHeader::new(MJPEG_PAYLOAD_TYPE, SeqNumber::new(1), 0, 0);
        let packet = MediaPacket::new(header, Bytes::new());
        let bytes = packet.to_bytes();

        assert_eq!(bytes.len(), HEADER_SIZE);
        let decoded = MediaPacket::from_bytes(&bytes).unwrap();
        assert!(decoded.payload.is_empty());
    }
}
