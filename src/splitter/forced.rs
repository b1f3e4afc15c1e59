use tracing::warn;

/// Slice text with no natural boundary into fixed windows
///
/// Every window but the last carries `marker`. The window length leaves room
/// for the larger of `safety_margin` and the marker itself; when the ceiling
/// is too small for that, only the marker is reserved, and a ceiling no larger
/// than the marker gets bare windows. Windows are trimmed and blank ones are
/// dropped.
pub fn force_split(text: &str, max_chars: usize, safety_margin: usize, marker: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let (window, marked) = window_len(max_chars, safety_margin, marker);
    let marker = if marked { marker } else { "" };

    warn!(
        chars = chars.len(),
        max_chars,
        window,
        "segment has no natural break point, forcing a lossy split"
    );

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + window).min(chars.len());
        let slice: String = chars[start..end].iter().collect();
        let slice = slice.trim();

        if !slice.is_empty() {
            if end < chars.len() {
                chunks.push(format!("{}{}", slice, marker));
            } else {
                chunks.push(slice.to_string());
            }
        }

        start = end;
    }

    chunks
}

/// Window length in characters, and whether the marker still fits after it
fn window_len(max_chars: usize, safety_margin: usize, marker: &str) -> (usize, bool) {
    let marker_len = marker.chars().count();
    let reserved = safety_margin.max(marker_len);

    if max_chars > reserved {
        (max_chars - reserved, true)
    } else if max_chars > marker_len {
        (max_chars - marker_len, true)
    } else {
        (max_chars.max(1), false)
    }
}
