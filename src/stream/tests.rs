use super::*;
use crate::config::{Config, ConfigError};
use futures::stream;
use std::convert::Infallible;

fn tokens(items: &[&str]) -> impl futures::Stream<Item = Result<String, Infallible>> {
    stream::iter(
        items
            .iter()
            .map(|t| Ok(t.to_string()))
            .collect::<Vec<_>>(),
    )
}

fn feed(buffer: &mut TokenBuffer, items: &[&str], sink: &mut Vec<String>) {
    for item in items {
        buffer.push(item, sink);
    }
}

#[test]
fn test_accumulates_below_ceiling() {
    let mut buffer = TokenBuffer::new(100).unwrap();
    let mut sink = Vec::new();

    feed(&mut buffer, &["Hello", ", ", "world"], &mut sink);
    assert!(sink.is_empty());
    assert_eq!(buffer.pending_chars(), 12);

    let stats = buffer.finish(&mut sink);
    assert_eq!(sink, vec!["Hello, world"]);
    assert_eq!(stats.chunks_emitted, 1);
    assert_eq!(stats.tokens_seen, 3);
}

#[test]
fn test_thinking_tokens_dropped() {
    let mut buffer = TokenBuffer::new(100).unwrap();
    let mut sink = Vec::new();

    feed(
        &mut buffer,
        &["<think>", "ignored", "</think>", "kept"],
        &mut sink,
    );
    let stats = buffer.finish(&mut sink);

    assert_eq!(sink, vec!["*thinking...*", "kept"]);
    assert_eq!(stats.notices_emitted, 1);
    assert_eq!(stats.chunks_emitted, 1);
    assert_eq!(stats.thinking_tokens_dropped, 1);
}

#[test]
fn test_state_transitions() {
    let mut buffer = TokenBuffer::new(100).unwrap();
    let mut sink = Vec::new();
    assert_eq!(buffer.state(), ThinkingState::Normal);

    buffer.push("<think>", &mut sink);
    assert_eq!(buffer.state(), ThinkingState::Thinking);

    // A second opener while thinking is not a new entry
    buffer.push("<think>", &mut sink);
    assert_eq!(sink.len(), 1);

    buffer.push("</think>", &mut sink);
    assert_eq!(buffer.state(), ThinkingState::Normal);

    // A stray closer changes nothing and is not emitted
    buffer.push("</think>", &mut sink);
    assert_eq!(buffer.state(), ThinkingState::Normal);
    assert_eq!(buffer.pending_chars(), 0);
}

#[test]
fn test_notice_does_not_flush_pending_text() {
    let mut buffer = TokenBuffer::new(100).unwrap();
    let mut sink = Vec::new();

    feed(
        &mut buffer,
        &["Let me check.", "<think>", "secret", "</think>", "Done."],
        &mut sink,
    );
    assert_eq!(sink, vec!["*thinking...*"]);
    assert_eq!(buffer.pending_chars(), 18);

    let stats = buffer.finish(&mut sink);
    assert_eq!(sink, vec!["*thinking...*", "Let me check.Done."]);
    assert_eq!(stats.chunks_emitted, 1);
}

#[test]
fn test_preamble_joins_answer_after_thinking() {
    let mut buffer = TokenBuffer::new(2000).unwrap();
    let mut sink = Vec::new();

    feed(
        &mut buffer,
        &["Sure, ", "<think>", "x", "</think>", "here it is."],
        &mut sink,
    );
    buffer.finish(&mut sink);

    assert_eq!(sink, vec!["*thinking...*", "Sure, here it is."]);
}

#[test]
fn test_thinking_isolation() {
    let mut buffer = TokenBuffer::new(8).unwrap();
    let mut sink = Vec::new();

    feed(
        &mut buffer,
        &[
            "visible ", "<think>", "SECRET", "\n", "SECRET", "</think>", "more ", "text\n", "end",
        ],
        &mut sink,
    );
    buffer.finish(&mut sink);

    assert!(sink.iter().all(|chunk| !chunk.contains("SECRET")));
    let visible: String = sink
        .iter()
        .filter(|c| c.as_str() != "*thinking...*")
        .map(String::as_str)
        .collect();
    assert_eq!(visible, "visible more text\nend");
}

#[test]
fn test_cut_at_last_newline() {
    let mut buffer = TokenBuffer::new(10).unwrap();
    let mut sink = Vec::new();

    feed(&mut buffer, &["abc\n", "def\n", "ghij"], &mut sink);
    assert_eq!(sink, vec!["abc\ndef\n"]);
    assert_eq!(buffer.pending_chars(), 4);

    buffer.finish(&mut sink);
    assert_eq!(sink, vec!["abc\ndef\n", "ghij"]);
}

#[test]
fn test_cut_at_ceiling_without_newline() {
    let mut buffer = TokenBuffer::new(5).unwrap();
    let mut sink = Vec::new();

    feed(&mut buffer, &["abcd", "efgh"], &mut sink);
    assert_eq!(sink, vec!["abcde"]);
    assert_eq!(buffer.stats().forced_cuts, 1);

    buffer.finish(&mut sink);
    assert_eq!(sink, vec!["abcde", "fgh"]);
}

#[test]
fn test_newline_at_ceiling_offset_not_used() {
    // The newline sits at index 4; keeping it would make a 5 char chunk
    let mut buffer = TokenBuffer::new(4).unwrap();
    let mut sink = Vec::new();

    feed(&mut buffer, &["abcd\nx"], &mut sink);
    assert_eq!(sink, vec!["abcd"]);
    buffer.finish(&mut sink);
    assert_eq!(sink, vec!["abcd", "\nx"]);
}

#[test]
fn test_huge_token_cut_repeatedly() {
    let mut buffer = TokenBuffer::new(10).unwrap();
    let mut sink = Vec::new();

    buffer.push(&"z".repeat(35), &mut sink);
    assert_eq!(sink.len(), 3);
    assert!(sink.iter().all(|c| c.chars().count() == 10));
    assert_eq!(buffer.pending_chars(), 5);

    buffer.finish(&mut sink);
    assert_eq!(sink.concat(), "z".repeat(35));
}

#[test]
fn test_pending_never_exceeds_ceiling() {
    let mut buffer = TokenBuffer::new(16).unwrap();
    let mut sink = Vec::new();

    for word in "the rain in spain\nstays mainly in the plain\n".repeat(10).split_inclusive(' ') {
        buffer.push(word, &mut sink);
        assert!(buffer.pending_chars() <= 16);
    }
    for chunk in &sink {
        assert!(chunk.chars().count() <= 16);
    }
}

#[test]
fn test_multibyte_cut() {
    let mut buffer = TokenBuffer::new(3).unwrap();
    let mut sink = Vec::new();

    feed(&mut buffer, &["你好", "世界"], &mut sink);
    buffer.finish(&mut sink);

    assert_eq!(sink, vec!["你好世", "界"]);
}

#[test]
fn test_empty_tokens_ignored() {
    let mut buffer = TokenBuffer::new(10).unwrap();
    let mut sink = Vec::new();

    feed(&mut buffer, &["", "", ""], &mut sink);
    let stats = buffer.finish(&mut sink);

    assert!(sink.is_empty());
    assert_eq!(stats.tokens_seen, 3);
    assert_eq!(stats.chunks_emitted, 0);
}

#[test]
fn test_empty_notice_disabled() {
    let mut buffer = TokenBuffer::with_sentinels(50, "<r>", "</r>", "").unwrap();
    let mut sink = Vec::new();

    feed(&mut buffer, &["<r>", "hidden", "</r>", "shown"], &mut sink);
    buffer.finish(&mut sink);

    assert_eq!(sink, vec!["shown"]);
}

#[test]
fn test_invalid_construction() {
    assert!(matches!(
        TokenBuffer::new(0),
        Err(ConfigError::CeilingOutOfRange { max_chars: 0, min: 1 })
    ));
    assert!(matches!(
        TokenBuffer::with_sentinels(10, "", "</t>", "n"),
        Err(ConfigError::EmptySentinel("think_open"))
    ));
    assert!(matches!(
        TokenBuffer::with_sentinels(10, "<t>", "<t>", "n"),
        Err(ConfigError::IdenticalSentinels(_))
    ));
}

#[test]
fn test_from_config() {
    let config = Config {
        max_chars: 6,
        think_open: "[[".to_string(),
        think_close: "]]".to_string(),
        thinking_notice: "(pondering)".to_string(),
        ..Config::default()
    };
    let mut buffer = TokenBuffer::from_config(&config).unwrap();
    let mut sink = Vec::new();

    feed(&mut buffer, &["[[", "x", "]]", "abcdefg"], &mut sink);
    buffer.finish(&mut sink);

    assert_eq!(sink, vec!["(pondering)", "abcdef", "g"]);
}

#[tokio::test]
async fn test_run_online_buffer_thinking() {
    let mut sink = Vec::new();
    let stats = run_online_buffer(
        tokens(&["<think>", "ignored", "</think>", "kept"]),
        100,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(sink, vec!["*thinking...*", "kept"]);
    assert_eq!(stats.chunks_emitted, 1);
}

#[tokio::test]
async fn test_run_online_buffer_newline_split() {
    let mut items = vec!["a"; 1500];
    items.push("\n");
    items.extend(vec!["b"; 1500]);

    let mut sink = Vec::new();
    let stats = run_online_buffer(tokens(&items), 2000, &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.len(), 2);
    assert!(sink[0].ends_with('\n'));
    assert_eq!(sink[0].chars().count(), 1501);
    assert_eq!(sink[0], format!("{}\n", "a".repeat(1500)));
    assert_eq!(sink[1], "b".repeat(1500));
    assert_eq!(stats.forced_cuts, 0);
}

#[tokio::test]
async fn test_run_online_buffer_empty_source() {
    let mut sink = Vec::new();
    let stats = run_online_buffer(tokens(&[]), 10, &mut sink).await.unwrap();

    assert!(sink.is_empty());
    assert_eq!(stats, BufferStats::default());
}

#[tokio::test]
async fn test_source_failure_flushes_pending() {
    let source = stream::iter(vec![
        Ok("partial ".to_string()),
        Ok("answer".to_string()),
        Err("connection reset".to_string()),
        Ok("never seen".to_string()),
    ]);

    let mut sink = Vec::new();
    let result = run_online_buffer(source, 100, &mut sink).await;

    assert!(matches!(result, Err(StreamError::TokenSource(_))));
    assert_eq!(sink, vec!["partial answer"]);
}

#[tokio::test]
async fn test_run_rejects_bad_ceiling() {
    let mut sink = Vec::new();
    let result = run_online_buffer(tokens(&["x"]), 0, &mut sink).await;

    assert!(matches!(result, Err(StreamError::Config(_))));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_closure_sink() {
    let mut count = 0;
    let mut total = String::new();
    let mut sink = |chunk: String| {
        count += 1;
        total.push_str(&chunk);
    };

    run_online_buffer(tokens(&["one\n", "two\n", "three"]), 5, &mut sink)
        .await
        .unwrap();

    assert_eq!(count, 3);
    assert_eq!(total, "one\ntwo\nthree");
}

#[tokio::test]
async fn test_channel_sink_feeds_receiver() {
    let (mut tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    run_online_buffer(tokens(&["alpha\n", "beta"]), 7, &mut tx)
        .await
        .unwrap();
    drop(tx);

    let mut received = Vec::new();
    while let Some(chunk) = rx.recv().await {
        received.push(chunk);
    }
    assert_eq!(received, vec!["alpha\n", "beta"]);
}
