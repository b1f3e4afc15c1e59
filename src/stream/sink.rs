use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Receives finished chunks in emission order
///
/// Called synchronously from the consuming task; a slow sink stalls token
/// consumption.
pub trait ChunkSink {
    fn send(&mut self, chunk: String);
}

impl<F> ChunkSink for F
where
    F: FnMut(String),
{
    fn send(&mut self, chunk: String) {
        self(chunk)
    }
}

impl ChunkSink for Vec<String> {
    fn send(&mut self, chunk: String) {
        self.push(chunk);
    }
}

/// Hands chunks to a separate delivery task
impl ChunkSink for UnboundedSender<String> {
    fn send(&mut self, chunk: String) {
        if let Err(e) = UnboundedSender::send(self, chunk) {
            warn!(chars = e.0.chars().count(), "chunk receiver dropped, discarding chunk");
        }
    }
}
