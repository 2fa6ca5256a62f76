//! Configuration file support for the streaming client

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Server host name or address
    pub server: String,
    /// Server control (session) port
    pub control_port: u16,
    /// Stream name to request
    pub stream: String,
    /// Local media-receive port advertised in SETUP
    #[serde(default = "default_media_port")]
    pub media_port: u16,
    /// Server port receiving feedback reports
    #[serde(default = "default_feedback_port")]
    pub feedback_port: u16,
    /// Media poll period in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Feedback report period in milliseconds
    #[serde(default = "default_report_interval")]
    pub report_interval_ms: u64,
    /// Media socket receive timeout in milliseconds
    #[serde(default = "default_recv_timeout")]
    pub recv_timeout_ms: u64,
    /// Receive buffer size in bytes
    #[serde(default = "default_recv_buffer")]
    pub recv_buffer_bytes: usize,
    /// Optional output file for received frames ("-" for stdout)
    pub output: Option<String>,
}

fn default_media_port() -> u16 {
    25000
}

fn default_feedback_port() -> u16 {
    19001
}

fn default_poll_interval() -> u64 {
    20
}

fn default_report_interval() -> u64 {
    400
}

fn default_recv_timeout() -> u64 {
    5
}

fn default_recv_buffer() -> usize {
    15000
}

impl PlayerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: PlayerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Create an example configuration
    pub fn example() -> Self {
        PlayerConfig {
            server: "localhost".to_string(),
            control_port: 13569,
            stream: "movie.Mjpeg".to_string(),
            media_port: default_media_port(),
            feedback_port: default_feedback_port(),
            poll_interval_ms: default_poll_interval(),
            report_interval_ms: default_report_interval(),
            recv_timeout_ms: default_recv_timeout(),
            recv_buffer_bytes: default_recv_buffer(),
            output: None,
        }
    }

    /// Media poll period as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Feedback report period as a Duration
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    /// Media socket receive timeout as a Duration
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
