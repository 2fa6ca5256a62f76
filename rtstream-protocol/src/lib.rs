//! Streaming Client Protocol Core
//!
//! This crate implements the protocol core of a real-time streaming client:
//! the media-transport packet codec, the feedback-report codec and interval
//! accumulator, the playout (frame synchronization) buffer, the
//! session-control state machine, and the shared reception statistics.

pub mod buffer;
pub mod control;
pub mod feedback;
pub mod packet;
pub mod receiver;
pub mod sequence;
pub mod session;
pub mod stats;

pub use buffer::PlayoutBuffer;
pub use control::{ControlChannel, ControlError, RequestBody, Response, Verb};
pub use feedback::{FeedbackAccumulator, FeedbackError, FeedbackReport};
pub use packet::{MediaPacket, PacketError, PacketHeader};
pub use receiver::StreamReceiver;
pub use sequence::SeqNumber;
pub use session::{ActionOutcome, Session, SessionError, SessionState};
pub use stats::{SessionStats, StatsHandle, StatsSnapshot};
