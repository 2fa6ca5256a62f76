//! UDP socket wrapper for the media and feedback transports
//!
//! Provides a cross-platform datagram socket with the receive-timeout
//! semantics the media poll needs: a short blocking timeout where expiry
//! means "no datagram this tick", not an error.

use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Default receive timeout for the media poll tick
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_millis(5);

/// Socket configuration errors
#[derive(Error, Debug)]
pub enum SocketError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid socket address")]
    InvalidAddress,
}

/// Datagram socket for media reception and feedback transmission
pub struct DatagramSocket {
    inner: Socket,
}

impl DatagramSocket {
    /// Bind a receive socket with the given poll timeout
    pub fn bind(addr: SocketAddr, recv_timeout: Duration) -> Result<Self, SocketError> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.set_read_timeout(Some(recv_timeout))?;

        Ok(DatagramSocket { inner: socket })
    }

    /// Create an unbound send socket (feedback path)
    pub fn unbound(ipv6: bool) -> Result<Self, SocketError> {
        let domain = if ipv6 { Domain::IPV6 } else { Domain::IPV4 };
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        Ok(DatagramSocket { inner: socket })
    }

    /// Get the local address this socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, SocketError> {
        self.inner
            .local_addr()?
            .as_socket()
            .ok_or(SocketError::InvalidAddress)
    }

    /// Send a datagram to the given address
    pub fn send_to(&self, buf: &[u8], target: SocketAddr) -> Result<usize, SocketError> {
        Ok(self.inner.send_to(buf, &target.into())?)
    }

    /// Receive one datagram, honoring the configured timeout
    ///
    /// Returns `Ok(None)` when the timeout expires with nothing to read —
    /// the tick completes as a no-op.
    pub fn recv(&self, buf: &mut [u8]) -> Result<Option<usize>, SocketError> {
        use std::mem::MaybeUninit;
        let uninit_buf = unsafe {
            std::slice::from_raw_parts_mut(buf.as_mut_ptr() as *mut MaybeUninit<u8>, buf.len())
        };

        match self.inner.recv(uninit_buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Ok(None)
            }
            Err(e) => Err(SocketError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_ephemeral() {
        let socket =
            DatagramSocket::bind("127.0.0.1:0".parse().unwrap(), DEFAULT_RECV_TIMEOUT).unwrap();
        assert!(socket.local_addr().unwrap().port() > 0);
    }

    #[test]
    fn test_recv_timeout_is_not_an_error() {
        let socket = DatagramSocket::bind(
            "127.0.0.1:0".parse().unwrap(),
            Duration::from_millis(5),
        )
        .unwrap();

        let mut buf = [0u8; 64];
        let outcome = socket.recv(&mut buf).unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn test_send_and_receive() {
        let receiver = DatagramSocket::bind(
            "127.0.0.1:0".parse().unwrap(),
            Duration::from_millis(100),
        )
        .unwrap();
        let sender = DatagramSocket::unbound(false).unwrap();

        let target = receiver.local_addr().unwrap();
        sender.send_to(b"tick", target).unwrap();

        let mut buf = [0u8; 64];
        for _ in 0..20 {
            if let Some(n) = receiver.recv(&mut buf).unwrap() {
                assert_eq!(&buf[..n], b"tick");
                return;
            }
        }
        panic!("datagram never arrived");
    }
}
