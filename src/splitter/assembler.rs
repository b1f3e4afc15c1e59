use super::cascade::Segment;
use super::forced::force_split;
use serde::Serialize;

/// A message-sized piece of text ready to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// The trimmed text content of this chunk
    pub text: String,
    /// Metadata about the chunk
    pub metadata: ChunkMetadata,
}

/// Metadata for a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkMetadata {
    /// Length of `text` in characters
    pub char_count: usize,
    /// Number of segments packed into this chunk
    pub segment_count: usize,
    /// True when the chunk came from a forced split of one oversized segment
    pub forced: bool,
}

/// Limits applied while packing segments
#[derive(Debug, Clone, Copy)]
pub struct PackLimits<'a> {
    pub max_chars: usize,
    pub safety_margin: usize,
    pub marker: &'a str,
}

/// Greedily pack segments into chunks:
/// - Keep appending segments while the chunk stays within `max_chars`
/// - Start a new chunk when the next segment would overflow
/// - Force-split a segment that alone exceeds `max_chars`
/// - Trim every chunk and drop the blank ones
pub fn assemble(segments: Vec<Segment>, limits: PackLimits<'_>) -> Vec<Chunk> {
    if segments.is_empty() {
        return vec![];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;
    let mut current_segments = 0;

    for segment in segments {
        let segment_chars = segment.char_len();

        // If this segment alone exceeds the ceiling, split it separately
        if segment_chars > limits.max_chars {
            if current_segments > 0 {
                push_chunk(&mut chunks, &current, current_segments, false);
                current.clear();
                current_chars = 0;
                current_segments = 0;
            }

            for piece in force_split(
                segment.text(),
                limits.max_chars,
                limits.safety_margin,
                limits.marker,
            ) {
                push_chunk(&mut chunks, &piece, 1, true);
            }
            continue;
        }

        if current_chars + segment_chars > limits.max_chars && current_segments > 0 {
            push_chunk(&mut chunks, &current, current_segments, false);
            current.clear();
            current_chars = 0;
            current_segments = 0;
        }

        current.push_str(segment.text());
        current_chars += segment_chars;
        current_segments += 1;
    }

    if current_segments > 0 {
        push_chunk(&mut chunks, &current, current_segments, false);
    }

    chunks
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: &str, segment_count: usize, forced: bool) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    chunks.push(Chunk {
        text: text.to_string(),
        metadata: ChunkMetadata {
            char_count: text.chars().count(),
            segment_count,
            forced,
        },
    });
}
