mod error;


pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-message ceiling of the downstream chat channel
pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Characters reserved at the end of every forced-split window
pub const DEFAULT_SAFETY_MARGIN: usize = 10;

/// Appended to every forced-split window except the last
pub const DEFAULT_TRUNCATION_MARKER: &str = "...";

pub const DEFAULT_THINK_OPEN: &str = "<think>";
pub const DEFAULT_THINK_CLOSE: &str = "</think>";
pub const DEFAULT_THINKING_NOTICE: &str = "*thinking...*";
pub const DEFAULT_FAILURE_NOTICE: &str = "Reply was too long and could not be delivered. Please try again later.";

/// Pause between consecutive messages of a multi-part reply
pub const DEFAULT_SEND_INTERVAL_MS: u64 = 500;

/// Settings shared by the offline splitter, the online buffer and delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum characters per chunk
    pub max_chars: usize,
    /// Characters reserved for the truncation marker in forced splits
    pub safety_margin: usize,
    /// Marker appended to non-final forced-split windows
    pub truncation_marker: String,
    /// Token that switches the online buffer into thinking mode
    pub think_open: String,
    /// Token that switches the online buffer back to normal mode
    pub think_close: String,
    /// Emitted once when thinking mode is entered
    pub thinking_notice: String,
    /// Pause between messages of a multi-part reply, in milliseconds
    pub send_interval_ms: u64,
    /// Sent as a reply when delivering a multi-part reply fails
    pub failure_notice: String,
    /// Default log level when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            truncation_marker: DEFAULT_TRUNCATION_MARKER.to_string(),
            think_open: DEFAULT_THINK_OPEN.to_string(),
            think_close: DEFAULT_THINK_CLOSE.to_string(),
            thinking_notice: DEFAULT_THINKING_NOTICE.to_string(),
            send_interval_ms: DEFAULT_SEND_INTERVAL_MS,
            failure_notice: DEFAULT_FAILURE_NOTICE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Missing keys keep their defaults. Integer values that fail to parse
    /// also keep their defaults instead of failing the load.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);
        let int = |key: &str, default: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(default)
        };

        Self {
            max_chars: int("DISCORD_REPLY_MAX_CHARS", defaults.max_chars),
            safety_margin: int("REPLY_SAFETY_MARGIN", defaults.safety_margin),
            truncation_marker: text("REPLY_TRUNCATION_MARKER", defaults.truncation_marker),
            think_open: text("THINK_OPEN_TOKEN", defaults.think_open),
            think_close: text("THINK_CLOSE_TOKEN", defaults.think_close),
            thinking_notice: text("THINKING_NOTICE", defaults.thinking_notice),
            send_interval_ms: lookup("REPLY_SEND_INTERVAL_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(defaults.send_interval_ms),
            failure_notice: text("REPLY_FAILURE_NOTICE", defaults.failure_notice),
            log_level: text("LOG_LEVEL", defaults.log_level).to_lowercase(),
        }
    }

    /// Load configuration from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Check every value the splitting components depend on
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_ceiling(self.max_chars, &self.truncation_marker)?;

        if self.think_open.is_empty() {
            return Err(ConfigError::EmptySentinel("think_open"));
        }
        if self.think_close.is_empty() {
            return Err(ConfigError::EmptySentinel("think_close"));
        }
        if self.think_open == self.think_close {
            return Err(ConfigError::IdenticalSentinels(self.think_open.clone()));
        }

        Ok(())
    }

    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }
}

/// Reject ceilings that are zero or smaller than the truncation marker
pub fn validate_ceiling(max_chars: usize, truncation_marker: &str) -> Result<(), ConfigError> {
    let min = truncation_marker.chars().count().max(1);
    if max_chars < min {
        return Err(ConfigError::CeilingOutOfRange { max_chars, min });
    }
    Ok(())
}
