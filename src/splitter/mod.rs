mod assembler;
mod cascade;
mod forced;


pub use assembler::{Chunk, ChunkMetadata};
pub use cascade::{Boundary, Segment, cascade};
pub use forced::force_split;

use crate::config::{
    Config, ConfigError, DEFAULT_SAFETY_MARGIN, DEFAULT_TRUNCATION_MARKER, validate_ceiling,
};
use assembler::{PackLimits, assemble};
use tracing::debug;

/// Offline splitter for a complete reply
///
/// Holds only validated limits, so one instance can be shared across
/// requests and threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splitter {
    max_chars: usize,
    safety_margin: usize,
    truncation_marker: String,
}

impl Splitter {
    /// Create a splitter with the default safety margin and marker
    pub fn new(max_chars: usize) -> Result<Self, ConfigError> {
        Self::with_options(max_chars, DEFAULT_SAFETY_MARGIN, DEFAULT_TRUNCATION_MARKER)
    }

    pub fn with_options(
        max_chars: usize,
        safety_margin: usize,
        truncation_marker: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let truncation_marker = truncation_marker.into();
        validate_ceiling(max_chars, &truncation_marker)?;

        Ok(Self {
            max_chars,
            safety_margin,
            truncation_marker,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::with_options(
            config.max_chars,
            config.safety_margin,
            config.truncation_marker.clone(),
        )
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn truncation_marker(&self) -> &str {
        &self.truncation_marker
    }

    /// Whether `text` can be sent as a single message
    pub fn fits(&self, text: &str) -> bool {
        text.chars().count() <= self.max_chars
    }

    /// Split `text` into chunks with metadata
    pub fn split_chunks(&self, text: &str) -> Vec<Chunk> {
        let segments = cascade(text);
        let segment_count = segments.len();

        let chunks = assemble(
            segments,
            PackLimits {
                max_chars: self.max_chars,
                safety_margin: self.safety_margin,
                marker: &self.truncation_marker,
            },
        );

        debug!(
            chars = text.chars().count(),
            segments = segment_count,
            chunks = chunks.len(),
            max_chars = self.max_chars,
            "split reply"
        );
        chunks
    }

    /// Split `text` into message-sized strings
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_chunks(text)
            .into_iter()
            .map(|chunk| chunk.text)
            .collect()
    }
}

/// Split a complete text into chunks of at most `max_length` characters
///
/// Uses the default safety margin and truncation marker. Fails when
/// `max_length` is zero or smaller than the marker.
pub fn segment_text(text: &str, max_length: usize) -> Result<Vec<String>, ConfigError> {
    Ok(Splitter::new(max_length)?.split(text))
}
