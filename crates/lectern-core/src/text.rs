//! # Text Helpers
//!
//! Display truncation, slug derivation and rich-text flattening. All
//! operations work on `char` boundaries and never split a code point.

use std::borrow::Cow;

use serde_json::Value;

/// Characters of title/subtitle text shown before truncation.
pub const PREVIEW_TEXT_BUDGET: usize = 60;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "…";

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim();
    if trimmed.contains(|c: char| c.is_whitespace() && c != ' ') || trimmed.contains("  ") {
        Cow::Owned(trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Cut `s` to at most `max_chars` characters, appending [`ELLIPSIS`] when
/// anything was removed.
///
/// Trailing whitespace before the marker is dropped, so `"Meet the   team"`
/// cut at 9 reads `"Meet the…"`.
pub fn truncate(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        None => Cow::Borrowed(s),
        Some((cut, _)) => {
            let mut out = s[..cut].trim_end().to_string();
            out.push_str(ELLIPSIS);
            Cow::Owned(out)
        }
    }
}

/// Derive a URL slug: lower-case ASCII alphanumerics, every other run of
/// characters collapsed to one `-`, no leading or trailing `-`, at most
/// `max_len` characters.
pub fn slugify(s: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(s.len().min(max_len));
    let mut pending_dash = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.len() > max_len {
        slug.truncate(max_len);
    }
    slug.trim_end_matches('-').to_string()
}

/// Plain text of a rich-text value: the span texts of each `block`, blocks
/// separated by a blank line. Non-text blocks contribute nothing.
pub fn plain_text(blocks: &Value) -> String {
    let Some(blocks) = blocks.as_array() else {
        return String::new();
    };
    blocks
        .iter()
        .filter(|b| b.get("_type").and_then(Value::as_str) == Some("block"))
        .filter_map(|b| b.get("children").and_then(Value::as_array))
        .map(|spans| {
            spans
                .iter()
                .filter_map(|span| span.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
