// Public API exports
pub mod config;
pub mod delivery;
pub mod logging;
pub mod splitter;
pub mod stream;

// Re-export main types for convenience
pub use config::{Config, ConfigError, DEFAULT_MAX_CHARS};

pub use splitter::{Boundary, Chunk, ChunkMetadata, Segment, Splitter, segment_text};

pub use stream::{
    BufferStats, ChunkSink, StreamError, ThinkingState, TokenBuffer, run_online_buffer,
};

pub use delivery::{DeliveryError, DeliveryOptions, DeliveryReport, ReplyTarget, deliver_reply};

pub use logging::{LoggingConfig, init_logging};
