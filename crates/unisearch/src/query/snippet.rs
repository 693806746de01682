//! Context snippets around the first match in extracted file text.

use crate::query::text_match;

/// Characters of context kept on each side of the match.
const CONTEXT_CHARS: usize = 40;

/// A short excerpt around a match, with the match span in byte offsets
/// relative to `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    pub match_start: usize,
    pub match_len: usize,
}

/// Builds a snippet around the first case-insensitive occurrence of
/// `needle` in `content`. Newlines inside the window are flattened to
/// spaces so the snippet renders on one line.
pub fn snippet_around(content: &str, needle: &str) -> Option<Snippet> {
    let (start, len) = text_match::find_ci(content, needle)?;

    let window_start = content[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map(|(offset, _)| offset)
        .unwrap_or(0);
    let window_end = content[start + len..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(offset, _)| start + len + offset)
        .unwrap_or(content.len());

    let text: String = content[window_start..window_end]
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    Some(Snippet {
        text,
        match_start: start - window_start,
        match_len: len,
    })
}
