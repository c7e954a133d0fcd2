use crate::terms::TermIndex;

/// A slice of translated paragraph text, tagged with its term key when the
/// slice is a configured surface form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub term: Option<String>,
}

impl Segment {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            term: None,
        }
    }

    pub fn term(text: &str, term: &str) -> Self {
        Self {
            text: text.to_string(),
            term: Some(term.to_string()),
        }
    }

    pub fn is_term(&self) -> bool {
        self.term.is_some()
    }
}

pub fn has_terms(segments: &[Segment]) -> bool {
    segments.iter().any(Segment::is_term)
}

/// Splits `text` on every surface form of `index`, keeping matches as their
/// own segments. Matching is case-insensitive, leftmost and longest-first and
/// never overlaps; concatenating the segments yields `text` again.
///
/// Forms are matched as plain substrings, so a short form inside a longer
/// unrelated word is tagged as well.
pub fn classify(text: &str, index: &TermIndex) -> Vec<Segment> {
    let pattern = match index.pattern() {
        Some(pattern) if !text.is_empty() => pattern,
        _ => return vec![Segment::plain(text)],
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::plain(&text[last..m.start()]));
        }
        let piece = m.as_str();
        match index.lookup(piece) {
            Some(term) => segments.push(Segment::term(piece, term)),
            None => segments.push(Segment::plain(piece)),
        }
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::plain(&text[last..]));
    }

    if segments.is_empty() {
        segments.push(Segment::plain(text));
    }
    segments
}
