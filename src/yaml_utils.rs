//! Session text utilities
//!
//! The session document is written by the producer into the same region as
//! binary data and can pick up stray control characters that break YAML
//! parsers. This module cleans the text without parsing it.

use std::borrow::Cow;

/// Strip control characters other than `\t`, `\n` and `\r`.
///
/// Borrows the input unchanged when there is nothing to strip.
pub fn sanitize_session_text(text: &str) -> Cow<'_, str> {
    let is_stray = |ch: char| ch.is_control() && !matches!(ch, '\t' | '\n' | '\r');

    if text.chars().any(is_stray) {
        Cow::Owned(text.chars().filter(|&ch| !is_stray(ch)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Decode document bytes as UTF-8, replacing invalid sequences.
pub fn decode_session_bytes(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
