use serde::Serialize;

use crate::errors::EngineError;

/// Default preview length, in characters.
pub const DEFAULT_PREVIEW_CHARS: usize = 600;

/// Canonical form of an uploaded document's text.
///
/// `text` is single-spaced and used for term scanning. `preview` is a prefix of
/// the trimmed original, line breaks intact, for human reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedDocument {
    pub text: String,
    pub preview: String,
}

/// Normalizes decoded document text.
///
/// Whitespace and control characters (form feeds and NULs are common in PDF
/// text layers) separate tokens; runs of them collapse to one space.
pub fn normalize(raw: &str, preview_chars: usize) -> Result<NormalizedDocument, EngineError> {
    let text = raw
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return Err(EngineError::EmptyDocument);
    }

    let preview = truncate_chars(raw.trim(), preview_chars).to_string();

    Ok(NormalizedDocument { text, preview })
}

/// Cuts `s` to at most `max_chars` characters, always on a char boundary.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
