//! Session-Control State Machine
//!
//! Drives the control protocol for one stream: issues requests, validates
//! responses, and tracks the session through `Init`, `Ready`, and `Playing`.
//! Actions attempted from a state with no defined transition are silent
//! no-ops, matching the protocol's dead-letter semantics: pressing play
//! before setup sends nothing and changes nothing.

use crate::control::{
    parse_response, render_request, ControlChannel, ControlError, RequestBody, Verb, STATUS_OK,
};
use crate::stats::{SessionStats, StatsHandle, StatsSnapshot};
use thiserror::Error;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no transport negotiated
    Init,
    /// Setup complete, ready to play
    Ready,
    /// Media and feedback timers armed
    Playing,
}

/// Session errors
///
/// Every variant is recoverable: the session stays in its pre-action state
/// so the operator may retry.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Control transport failure: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Server rejected request with status {0}")]
    Rejected(u32),

    #[error("Invalid response: {0}")]
    Response(String),
}

impl From<ControlError> for SessionError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Transport(io) => SessionError::Transport(io),
            other => SessionError::Response(other.to_string()),
        }
    }
}

/// Result of a requested state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Request sent, response validated, transition applied
    Applied,
    /// No transition defined from the current state; nothing was sent
    Ignored,
}

/// Control-protocol session for one named stream
///
/// Generic over the control channel so the state machine is testable with a
/// scripted transcript. Owns the statistics handle shared with the poll and
/// report routines.
pub struct Session<C: ControlChannel> {
    channel: C,
    state: SessionState,
    /// Control-sequence counter, strictly increasing across the session
    cseq: u32,
    /// Assigned by the remote side on the first successful setup, 0 until then
    session_id: u32,
    stream_name: String,
    /// Local media-receive port advertised in SETUP
    client_port: u16,
    stats: StatsHandle,
    /// Most recent DESCRIBE content block, kept opaque for display
    last_description: Option<Vec<String>>,
}

impl<C: ControlChannel> Session<C> {
    /// Create a session in the `Init` state
    pub fn new(channel: C, stream_name: impl Into<String>, client_port: u16) -> Self {
        Session {
            channel,
            state: SessionState::Init,
            cseq: 0,
            session_id: 0,
            stream_name: stream_name.into(),
            client_port,
            stats: SessionStats::new_handle(),
            last_description: None,
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the data-plane timers should be armed
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// Session identifier assigned by the remote side (0 before setup)
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Control-sequence counter value
    pub fn cseq(&self) -> u32 {
        self.cseq
    }

    /// Name of the requested stream
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Shared handle for the poll and report routines
    pub fn stats_handle(&self) -> StatsHandle {
        self.stats.clone()
    }

    /// Display-oriented statistics snapshot
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.read().snapshot()
    }

    /// Most recent DESCRIBE content block
    pub fn description(&self) -> Option<&[String]> {
        self.last_description.as_deref()
    }

    /// Issue one request and return the validated response
    fn exchange(
        &mut self,
        verb: Verb,
        body: RequestBody,
    ) -> Result<crate::control::Response, SessionError> {
        let request = render_request(verb, &self.stream_name, self.cseq, body);
        tracing::debug!(verb = verb.as_str(), cseq = self.cseq, "sending request");
        self.channel.send_request(&request)?;

        let response = parse_response(&mut self.channel)?;
        if response.status != STATUS_OK {
            tracing::warn!(verb = verb.as_str(), status = response.status, "request rejected");
            return Err(SessionError::Rejected(response.status));
        }
        Ok(response)
    }

    /// SETUP: negotiate the session and move `Init` -> `Ready`
    ///
    /// Resets the control-sequence counter to 1 and stores the session
    /// identifier the server assigns. The caller binds the media-receive
    /// transport once this returns `Applied`.
    pub fn setup(&mut self) -> Result<ActionOutcome, SessionError> {
        if self.state != SessionState::Init {
            tracing::info!(state = ?self.state, "setup ignored");
            return Ok(ActionOutcome::Ignored);
        }

        self.cseq = 1;
        let body = RequestBody::Setup {
            client_port: self.client_port,
        };
        let response = self.exchange(Verb::Setup, body)?;

        // The identifier is assigned exactly once, on the first success.
        if self.session_id == 0 {
            self.session_id = response
                .session_id
                .ok_or_else(|| SessionError::Response("missing Session header".to_string()))?;
        }

        self.state = SessionState::Ready;
        tracing::info!(session_id = self.session_id, "session state: READY");
        Ok(ActionOutcome::Applied)
    }

    /// PLAY: move `Ready` -> `Playing` and arm the data-plane timers
    pub fn play(&mut self) -> Result<ActionOutcome, SessionError> {
        if self.state != SessionState::Ready {
            tracing::info!(state = ?self.state, "play ignored");
            return Ok(ActionOutcome::Ignored);
        }

        self.cseq += 1;
        let body = RequestBody::Other {
            session_id: self.session_id,
        };
        self.exchange(Verb::Play, body)?;

        self.state = SessionState::Playing;
        tracing::info!("session state: PLAYING");
        Ok(ActionOutcome::Applied)
    }

    /// PAUSE: move `Playing` -> `Ready` and disarm the timers
    pub fn pause(&mut self) -> Result<ActionOutcome, SessionError> {
        if self.state != SessionState::Playing {
            tracing::info!(state = ?self.state, "pause ignored");
            return Ok(ActionOutcome::Ignored);
        }

        self.cseq += 1;
        let body = RequestBody::Other {
            session_id: self.session_id,
        };
        self.exchange(Verb::Pause, body)?;

        self.state = SessionState::Ready;
        tracing::info!("session state: READY");
        Ok(ActionOutcome::Applied)
    }

    /// TEARDOWN: end the session from any state
    pub fn teardown(&mut self) -> Result<ActionOutcome, SessionError> {
        self.cseq += 1;
        let body = RequestBody::Other {
            session_id: self.session_id,
        };
        self.exchange(Verb::Teardown, body)?;

        self.state = SessionState::Init;
        tracing::info!("session state: INIT");
        Ok(ActionOutcome::Applied)
    }

    /// DESCRIBE: fetch stream information; no state change
    ///
    /// The content block is stored and returned opaque; it is display
    /// material, not protocol input.
    pub fn describe(&mut self) -> Result<Option<Vec<String>>, SessionError> {
        self.cseq += 1;
        let response = self.exchange(Verb::Describe, RequestBody::Describe)?;

        if response.description.is_some() {
            self.last_description = response.description.clone();
        }
        Ok(response.description)
    }
}
