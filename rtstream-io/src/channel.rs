//! TCP control channel
//!
//! Implements the line-oriented `ControlChannel` over a TCP stream. The
//! protocol defines no response timeout, so one is set here: a silent
//! server surfaces as a transport error instead of hanging the caller
//! forever.

use rtstream_protocol::control::ControlChannel;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use thiserror::Error;

/// Default control-response timeout
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Control-channel setup errors
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Line-oriented control channel over TCP
pub struct TcpControlChannel {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TcpControlChannel {
    /// Connect to the control endpoint
    pub fn connect(addr: SocketAddr, response_timeout: Duration) -> Result<Self, ChannelError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(response_timeout))?;
        stream.set_nodelay(true)?;

        let reader = BufReader::new(stream.try_clone()?);
        tracing::info!(%addr, "control channel connected");

        Ok(TcpControlChannel {
            reader,
            writer: stream,
        })
    }
}

impl ControlChannel for TcpControlChannel {
    fn send_request(&mut self, request: &str) -> io::Result<()> {
        self.writer.write_all(request.as_bytes())?;
        self.writer.flush()
    }

    fn recv_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "control channel closed",
            ));
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_request_response_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone()?);

            let mut request_line = String::new();
            reader.read_line(&mut request_line)?;
            assert!(request_line.starts_with("SETUP"));

            let mut stream = stream;
            stream.write_all(b"RTSP/1.0 200 OK\r\n")?;
            Ok::<_, io::Error>(())
        });

        let mut channel =
            TcpControlChannel::connect(addr, Duration::from_secs(1)).unwrap();
        channel
            .send_request("SETUP movie.Mjpeg RTSP/1.0\r\nCSeq: 1\r\n")
            .unwrap();

        let line = channel.recv_line().unwrap();
        assert_eq!(line, "RTSP/1.0 200 OK");

        server.join().unwrap().unwrap();
    }

    #[test]
    fn test_closed_channel_is_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let mut channel =
            TcpControlChannel::connect(addr, Duration::from_secs(1)).unwrap();
        server.join().unwrap();

        let err = channel.recv_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
