//! rtstream - Real-Time Streaming Client
//!
//! High-level Rust API for the streaming client: session control, media
//! reception, playout synchronization, and quality feedback.

pub use rtstream_io as io;
pub use rtstream_protocol as protocol;

// Re-export commonly used types
pub use protocol::{
    FeedbackAccumulator, FeedbackReport, MediaPacket, PlayoutBuffer, SeqNumber, Session,
    SessionState, StreamReceiver,
};
