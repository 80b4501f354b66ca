//! Value records passed through one assembly invocation.

use serde::Serialize;

/// Maximum accepted question length, in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;
/// Maximum accepted user-supplied context length, in characters.
pub const MAX_CONTEXT_CHARS: usize = 4000;

/// Inputs to one assembly invocation.
#[derive(Clone, Debug, Default)]
pub struct Query {
    /// Natural language question. Required, trimmed and length-capped.
    pub question: String,
    /// Optional user-supplied passage (e.g. selected text on the page).
    pub context: Option<String>,
    /// If true, skip all external retrieval and answer from `context` alone.
    pub use_context_only: bool,
    /// Restrict retrieval to one chapter. Best-effort: sources may ignore it.
    pub chapter_scope: Option<i32>,
}

/// One attributed passage returned alongside the answer.
///
/// `relevance_score` semantics vary by source (vector similarity, full-text
/// rank, or a fixed constant for synthesized citations) and are never
/// normalized across sources.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceCitation {
    pub chunk_id: String,
    pub chapter_id: i32,
    pub section_id: String,
    pub section_title: String,
    pub preview_text: String,
    pub relevance_score: f32,
}

/// Output of one assembly invocation.
#[derive(Clone, Debug)]
pub struct AnswerResult {
    pub answer: String,
    /// Citations in concatenation order (structured store first), not
    /// re-ranked by score.
    pub sources: Vec<SourceCitation>,
    /// Wall-clock duration of the invocation, diagnostic only.
    pub timing_ms: f64,
}

/// Caps a string at `max` characters, respecting char boundaries.
pub(crate) fn cap_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_chars_respects_boundaries() {
        assert_eq!(cap_chars("hello", 10), "hello");
        assert_eq!(cap_chars("hello", 3), "hel");
        // multibyte: must not split a char
        assert_eq!(cap_chars("héllo", 2), "hé");
    }
}
