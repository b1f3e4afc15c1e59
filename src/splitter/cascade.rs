/// Natural break points, ordered from strongest to weakest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Blank line between paragraphs
    Paragraph,
    /// Single line break
    LineBreak,
    /// 。！？
    CjkSentence,
    /// . ! ?
    LatinSentence,
    /// ，；：、
    CjkClause,
    /// , ; :
    LatinClause,
    /// Plain space between words
    Space,
}

impl Boundary {
    /// Priority order in which the cascade refines text
    pub const CASCADE: [Boundary; 7] = [
        Boundary::Paragraph,
        Boundary::LineBreak,
        Boundary::CjkSentence,
        Boundary::LatinSentence,
        Boundary::CjkClause,
        Boundary::LatinClause,
        Boundary::Space,
    ];

    /// Byte length of this boundary if `rest` starts with it
    pub fn match_len(self, rest: &str) -> Option<usize> {
        match self {
            Boundary::Paragraph => ["\r\n\r\n", "\n\n"]
                .iter()
                .find(|p| rest.starts_with(**p))
                .map(|p| p.len()),
            Boundary::LineBreak => ["\r\n", "\n"]
                .iter()
                .find(|p| rest.starts_with(**p))
                .map(|p| p.len()),
            Boundary::CjkSentence => leading_char_in(rest, &['。', '！', '？']),
            Boundary::LatinSentence => leading_char_in(rest, &['.', '!', '?']),
            Boundary::CjkClause => leading_char_in(rest, &['，', '；', '：', '、']),
            Boundary::LatinClause => leading_char_in(rest, &[',', ';', ':']),
            Boundary::Space => leading_char_in(rest, &[' ']),
        }
    }
}

fn leading_char_in(rest: &str, set: &[char]) -> Option<usize> {
    rest.chars()
        .next()
        .filter(|c| set.contains(c))
        .map(char::len_utf8)
}

/// A slice of the source text ending at a boundary (or at end of input)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Text including the terminating boundary characters
    text: String,
    /// Boundary that ended this segment, `None` for the unterminated tail
    pub boundary: Option<Boundary>,
    /// Byte length of `text` before the terminator
    body_len: usize,
}

impl Segment {
    fn new(text: String, boundary: Option<Boundary>, terminator_len: usize) -> Self {
        let body_len = text.len() - terminator_len;
        Self {
            text,
            boundary,
            body_len,
        }
    }

    /// Text including the terminating boundary characters
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text before the terminating boundary
    pub fn body(&self) -> &str {
        &self.text[..self.body_len]
    }

    /// The terminating boundary characters, empty for the tail
    pub fn terminator(&self) -> &str {
        &self.text[self.body_len..]
    }

    /// Length in characters, terminator included
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Refine `text` into segments, one pass per boundary in priority order
///
/// Concatenating the returned segments reproduces `text` exactly.
pub fn cascade(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return vec![];
    }

    let mut segments = vec![Segment::new(text.to_string(), None, 0)];
    for boundary in Boundary::CASCADE {
        segments = segments
            .into_iter()
            .flat_map(|segment| refine(segment, boundary))
            .collect();
    }
    segments
}

/// Re-split one segment's body on `boundary`
///
/// The terminator a coarser pass attached stays with the last piece, so a
/// finer pass never cuts into it.
fn refine(segment: Segment, boundary: Boundary) -> Vec<Segment> {
    let body = segment.body();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut cursor = 0;

    while cursor < body.len() {
        match boundary.match_len(&body[cursor..]) {
            Some(len) => {
                let end = cursor + len;
                pieces.push(Segment::new(body[start..end].to_string(), Some(boundary), len));
                start = end;
                cursor = end;
            }
            None => {
                cursor += body[cursor..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if pieces.is_empty() {
        return vec![segment];
    }

    let tail = &body[start..];
    let terminator = segment.terminator();
    if !tail.is_empty() || !terminator.is_empty() {
        pieces.push(Segment::new(
            format!("{}{}", tail, terminator),
            segment.boundary,
            terminator.len(),
        ));
    }

    pieces
}
