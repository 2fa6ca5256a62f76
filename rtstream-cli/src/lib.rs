//! Streaming Client CLI Library
//!
//! Shared functionality for the command-line player.

pub mod config;
pub mod stats;

pub use config::{ConfigError, PlayerConfig};
pub use stats::{display_stats, format_bytes, format_compact_stats, format_rate};
