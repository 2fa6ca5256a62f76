//! Streaming Client I/O
//!
//! Transport plumbing for the protocol core: UDP datagram sockets with
//! poll-friendly timeout semantics, the TCP control channel, and the
//! cooperative timer that drives the periodic ticks.

pub mod channel;
pub mod socket;
pub mod time;

pub use channel::{ChannelError, TcpControlChannel, DEFAULT_RESPONSE_TIMEOUT};
pub use socket::{DatagramSocket, SocketError, DEFAULT_RECV_TIMEOUT};
pub use time::Timer;
