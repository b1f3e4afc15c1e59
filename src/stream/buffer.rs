use super::error::StreamError;
use super::sink::ChunkSink;
use crate::config::{
    Config, ConfigError, DEFAULT_THINK_CLOSE, DEFAULT_THINK_OPEN, DEFAULT_THINKING_NOTICE,
    validate_ceiling,
};
use futures::{Stream, StreamExt, pin_mut};
use serde::Serialize;
use tracing::{debug, warn};

/// Whether the model is currently producing reasoning the user never sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThinkingState {
    #[default]
    Normal,
    Thinking,
}

/// Counters collected over one run of the buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    /// Tokens received, sentinels included
    pub tokens_seen: usize,
    /// Tokens discarded while thinking
    pub thinking_tokens_dropped: usize,
    /// Text chunks delivered to the sink, notices excluded
    pub chunks_emitted: usize,
    /// Thinking notices delivered to the sink
    pub notices_emitted: usize,
    /// Cuts made at the ceiling because no newline was available
    pub forced_cuts: usize,
}

/// Accumulates streamed tokens and flushes them as chat-sized chunks
///
/// One buffer serves one model invocation. Feed it with [`TokenBuffer::push`]
/// and end with [`TokenBuffer::finish`], or hand it a whole token stream
/// through [`TokenBuffer::run`].
#[derive(Debug)]
pub struct TokenBuffer {
    max_chars: usize,
    think_open: String,
    think_close: String,
    thinking_notice: String,
    state: ThinkingState,
    /// Tokens received since the last flush
    pending: Vec<String>,
    /// Total characters across `pending`
    pending_chars: usize,
    stats: BufferStats,
}

impl TokenBuffer {
    /// Create a buffer with the default sentinels and notice
    pub fn new(max_chars: usize) -> Result<Self, ConfigError> {
        Self::with_sentinels(
            max_chars,
            DEFAULT_THINK_OPEN,
            DEFAULT_THINK_CLOSE,
            DEFAULT_THINKING_NOTICE,
        )
    }

    /// Create a buffer with custom sentinels; an empty notice disables it
    pub fn with_sentinels(
        max_chars: usize,
        think_open: impl Into<String>,
        think_close: impl Into<String>,
        thinking_notice: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        validate_ceiling(max_chars, "")?;

        let think_open = think_open.into();
        let think_close = think_close.into();
        if think_open.is_empty() {
            return Err(ConfigError::EmptySentinel("think_open"));
        }
        if think_close.is_empty() {
            return Err(ConfigError::EmptySentinel("think_close"));
        }
        if think_open == think_close {
            return Err(ConfigError::IdenticalSentinels(think_open));
        }

        Ok(Self {
            max_chars,
            think_open,
            think_close,
            thinking_notice: thinking_notice.into(),
            state: ThinkingState::Normal,
            pending: Vec::new(),
            pending_chars: 0,
            stats: BufferStats::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::with_sentinels(
            config.max_chars,
            config.think_open.clone(),
            config.think_close.clone(),
            config.thinking_notice.clone(),
        )
    }

    pub fn state(&self) -> ThinkingState {
        self.state
    }

    pub fn pending_chars(&self) -> usize {
        self.pending_chars
    }

    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }

    /// Consume one token, emitting any chunk it completes
    pub fn push<S: ChunkSink>(&mut self, token: &str, sink: &mut S) {
        self.stats.tokens_seen += 1;

        if token == self.think_open {
            if self.state == ThinkingState::Normal {
                // Pending text keeps accumulating across the reasoning block
                self.state = ThinkingState::Thinking;
                if !self.thinking_notice.is_empty() {
                    sink.send(self.thinking_notice.clone());
                    self.stats.notices_emitted += 1;
                }
            }
            return;
        }

        if token == self.think_close {
            self.state = ThinkingState::Normal;
            return;
        }

        if self.state == ThinkingState::Thinking {
            self.stats.thinking_tokens_dropped += 1;
            return;
        }

        if token.is_empty() {
            return;
        }

        self.pending_chars += token.chars().count();
        self.pending.push(token.to_string());

        while self.pending_chars > self.max_chars {
            self.cut(sink);
        }
    }

    /// Emit everything pending, regardless of size
    pub fn flush<S: ChunkSink>(&mut self, sink: &mut S) {
        if self.pending.is_empty() {
            return;
        }

        let text = self.pending.concat();
        self.pending.clear();
        self.pending_chars = 0;
        self.emit(text, sink);
    }

    /// Final flush once the token source is exhausted
    pub fn finish<S: ChunkSink>(mut self, sink: &mut S) -> BufferStats {
        self.flush(sink);
        debug!(
            tokens = self.stats.tokens_seen,
            chunks = self.stats.chunks_emitted,
            dropped = self.stats.thinking_tokens_dropped,
            forced_cuts = self.stats.forced_cuts,
            "token stream finished"
        );
        self.stats
    }

    /// Drive the buffer over a whole token stream
    ///
    /// Pending text is flushed both when the stream ends and when it fails;
    /// a failure is returned after that flush.
    pub async fn run<St, T, E, S>(mut self, source: St, sink: &mut S) -> Result<BufferStats, StreamError>
    where
        St: Stream<Item = Result<T, E>>,
        T: AsRef<str>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        S: ChunkSink,
    {
        pin_mut!(source);

        while let Some(item) = source.next().await {
            match item {
                Ok(token) => self.push(token.as_ref(), sink),
                Err(e) => {
                    let error = e.into();
                    warn!(
                        error = %error,
                        pending = self.pending_chars,
                        "token source failed, flushing pending text"
                    );
                    self.flush(sink);
                    return Err(StreamError::TokenSource(error));
                }
            }
        }

        Ok(self.finish(sink))
    }

    /// Emit the head of the pending text, cut at the last newline that keeps
    /// it within the ceiling, or exactly at the ceiling when there is none
    fn cut<S: ChunkSink>(&mut self, sink: &mut S) {
        let mut text = self.pending.concat();
        let limit = text
            .char_indices()
            .nth(self.max_chars)
            .map_or(text.len(), |(i, _)| i);

        let head_end = match text[..limit].rfind('\n') {
            Some(i) => i + 1,
            None => {
                self.stats.forced_cuts += 1;
                limit
            }
        };

        let tail = text.split_off(head_end);
        self.pending_chars -= text.chars().count();
        self.pending.clear();
        if !tail.is_empty() {
            self.pending.push(tail);
        }

        self.emit(text, sink);
    }

    fn emit<S: ChunkSink>(&mut self, text: String, sink: &mut S) {
        debug!(chars = text.chars().count(), "flushing streamed chunk");
        self.stats.chunks_emitted += 1;
        sink.send(text);
    }
}
