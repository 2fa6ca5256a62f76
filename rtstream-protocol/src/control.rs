//! Control-Protocol Requests and Responses
//!
//! The session-control protocol is text based: CRLF-terminated lines over a
//! reliable byte stream. A request is a verb line, a CSeq line, and exactly
//! one verb-dependent header line. A response is a status line followed, on
//! success, by a CSeq echo and either a session identifier or a content
//! description block.

use std::io;
use thiserror::Error;

/// Protocol tag used on request and status lines
pub const PROTOCOL_TAG: &str = "RTSP/1.0";

/// Line terminator for the control protocol
pub const CRLF: &str = "\r\n";

/// Success status code
pub const STATUS_OK: u32 = 200;

/// Number of descriptive lines following a `Content-Base:` header
pub const DESCRIPTION_LINES: usize = 6;

/// Duplex line-oriented text channel carrying the control protocol
///
/// Implemented over TCP in `rtstream-io`; tests use scripted channels.
pub trait ControlChannel {
    /// Write a complete request (already CRLF-terminated) and flush it
    fn send_request(&mut self, request: &str) -> io::Result<()>;

    /// Read one line, with the terminator stripped
    fn recv_line(&mut self) -> io::Result<String>;
}

/// Control errors (transport and malformed-response failures)
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Control transport failure: {0}")]
    Transport(#[from] io::Error),

    #[error("Malformed status line: {0:?}")]
    MalformedStatusLine(String),

    #[error("Malformed header line: {0:?}")]
    MalformedHeader(String),
}

/// Control request verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Setup,
    Play,
    Pause,
    Teardown,
    Describe,
}

impl Verb {
    /// Wire spelling of the verb
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Setup => "SETUP",
            Verb::Play => "PLAY",
            Verb::Pause => "PAUSE",
            Verb::Teardown => "TEARDOWN",
            Verb::Describe => "DESCRIBE",
        }
    }
}

/// The verb-dependent third request line
///
/// Exactly one variant applies per request; the match below is exhaustive so
/// no verb can accidentally emit another verb's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestBody {
    /// SETUP advertises the local media-receive port
    Setup { client_port: u16 },
    /// DESCRIBE declares the acceptable content type
    Describe,
    /// Every other verb echoes the session identifier
    Other { session_id: u32 },
}

/// Render a complete request
pub fn render_request(verb: Verb, stream_name: &str, cseq: u32, body: RequestBody) -> String {
    let header = match body {
        RequestBody::Setup { client_port } => {
            format!("Transport: RTP/UDP; client_port= {client_port}")
        }
        RequestBody::Describe => "Accept: application/sdp".to_string(),
        RequestBody::Other { session_id } => format!("Session: {session_id}"),
    };

    format!(
        "{verb} {stream_name} {proto}{crlf}CSeq: {cseq}{crlf}{header}{crlf}",
        verb = verb.as_str(),
        proto = PROTOCOL_TAG,
        crlf = CRLF,
    )
}

/// Parsed control response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Numeric status code from the status line
    pub status: u32,
    /// Session identifier, when the response carried a `Session:` line
    pub session_id: Option<u32>,
    /// Opaque description block, when the response carried `Content-Base:`
    pub description: Option<Vec<String>>,
}

/// Read and parse one response from the control channel
///
/// Only the status line is read for non-200 responses. On 200 the CSeq echo
/// line is consumed, then the third line decides between a session
/// identifier and a fixed-size description block.
pub fn parse_response<C: ControlChannel>(channel: &mut C) -> Result<Response, ControlError> {
    let status_line = channel.recv_line()?;
    tracing::debug!(line = %status_line, "control response");

    let mut tokens = status_line.split_whitespace();
    let _proto = tokens
        .next()
        .ok_or_else(|| ControlError::MalformedStatusLine(status_line.clone()))?;
    let status: u32 = tokens
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| ControlError::MalformedStatusLine(status_line.clone()))?;

    if status != STATUS_OK {
        return Ok(Response {
            status,
            session_id: None,
            description: None,
        });
    }

    let _cseq_line = channel.recv_line()?;

    let header_line = channel.recv_line()?;
    let mut tokens = header_line.split_whitespace();
    let name = tokens.next().unwrap_or("");

    let mut session_id = None;
    let mut description = None;

    if name == "Session:" {
        let id = tokens
            .next()
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| ControlError::MalformedHeader(header_line.clone()))?;
        session_id = Some(id);
    } else if name == "Content-Base:" {
        let mut lines = Vec::with_capacity(DESCRIPTION_LINES + 1);
        lines.push(header_line.clone());
        for _ in 0..DESCRIPTION_LINES {
            lines.push(channel.recv_line()?);
        }
        description = Some(lines);
    }

    Ok(Response {
        status,
        session_id,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Channel fed from a canned line script
    struct ScriptedChannel {
        lines: VecDeque<String>,
        sent: Vec<String>,
    }

    impl ScriptedChannel {
        fn new(lines: &[&str]) -> Self {
            ScriptedChannel {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                sent: Vec::new(),
            }
        }
    }

    impl ControlChannel for ScriptedChannel {
        fn send_request(&mut self, request: &str) -> io::Result<()> {
            self.sent.push(request.to_string());
            Ok(())
        }

        fn recv_line(&mut self) -> io::Result<String> {
            self.lines
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    #[test]
    fn test_render_setup_request() {
        let req = render_request(
            Verb::Setup,
            "movie.Mjpeg",
            1,
            RequestBody::Setup { client_port: 25000 },
        );
        assert_eq!(
            req,
            "SETUP movie.Mjpeg RTSP/1.0\r\nCSeq: 1\r\nTransport: RTP/UDP; client_port= 25000\r\n"
        );
    }

    #[test]
    fn test_render_describe_request() {
        let req = render_request(Verb::Describe, "movie.Mjpeg", 3, RequestBody::Describe);
        assert!(req.contains("Accept: application/sdp\r\n"));
        assert!(!req.contains("Session:"));
        assert!(!req.contains("Transport:"));
    }

    #[test]
    fn test_render_play_request_echoes_session() {
        let req = render_request(
            Verb::Play,
            "movie.Mjpeg",
            2,
            RequestBody::Other { session_id: 777 },
        );
        assert_eq!(
            req,
            "PLAY movie.Mjpeg RTSP/1.0\r\nCSeq: 2\r\nSession: 777\r\n"
        );
    }

    #[test]
    fn test_parse_ok_with_session_id() {
        let mut chan = ScriptedChannel::new(&["RTSP/1.0 200 OK", "CSeq: 1", "Session: 123456"]);
        let resp = parse_response(&mut chan).unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.session_id, Some(123456));
        assert!(resp.description.is_none());
    }

    #[test]
    fn test_parse_ok_with_description() {
        let mut chan = ScriptedChannel::new(&[
            "RTSP/1.0 200 OK",
            "CSeq: 4",
            "Content-Base: movie.Mjpeg",
            "Content-Type: application/sdp",
            "Content-Length: 42",
            "v=0",
            "o=stream",
            "s=session",
            "m=video",
        ]);
        let resp = parse_response(&mut chan).unwrap();

        assert_eq!(resp.status, 200);
        assert!(resp.session_id.is_none());
        let description = resp.description.unwrap();
        assert_eq!(description.len(), DESCRIPTION_LINES + 1);
        assert_eq!(description[0], "Content-Base: movie.Mjpeg");
    }

    #[test]
    fn test_parse_error_status_reads_nothing_more() {
        let mut chan = ScriptedChannel::new(&["RTSP/1.0 404 Not Found"]);
        let resp = parse_response(&mut chan).unwrap();

        assert_eq!(resp.status, 404);
        assert!(chan.lines.is_empty());
    }

    #[test]
    fn test_parse_malformed_status_line() {
        let mut chan = ScriptedChannel::new(&["garbage"]);
        let err = parse_response(&mut chan).unwrap_err();
        assert!(matches!(err, ControlError::MalformedStatusLine(_)));
    }

    #[test]
    fn test_parse_malformed_session_header() {
        let mut chan = ScriptedChannel::new(&["RTSP/1.0 200 OK", "CSeq: 1", "Session: abc"]);
        let err = parse_response(&mut chan).unwrap_err();
        assert!(matches!(err, ControlError::MalformedHeader(_)));
    }

    #[test]
    fn test_parse_truncated_response_is_transport_error() {
        let mut chan = ScriptedChannel::new(&["RTSP/1.0 200 OK"]);
        let err = parse_response(&mut chan).unwrap_err();
        assert!(matches!(err, ControlError::Transport(_)));
    }
}
