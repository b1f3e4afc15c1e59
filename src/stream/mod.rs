mod buffer;
mod error;
mod sink;

#[cfg(test)]
mod tests;

pub use buffer::{BufferStats, ThinkingState, TokenBuffer};
pub use error::StreamError;
pub use sink::ChunkSink;

use futures::Stream;

/// Run a fresh buffer with the default sentinels over `source`
///
/// Returns once the source is exhausted and the final flush has reached
/// `sink`. A source error is returned after pending text is flushed.
pub async fn run_online_buffer<St, T, E, S>(
    source: St,
    max_length: usize,
    sink: &mut S,
) -> Result<BufferStats, StreamError>
where
    St: Stream<Item = Result<T, E>>,
    T: AsRef<str>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: ChunkSink,
{
    TokenBuffer::new(max_length)?.run(source, sink).await
}
