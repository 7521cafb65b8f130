//! Common text utilities

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clip a string to at most `max_chars` characters, returning (clipped, was_clipped).
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn clip_chars(s: &str, max_chars: usize) -> (String, bool) {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => (s[..end].to_string(), true),
        None => (s.to_string(), false),
    }
}

/// Replace tabs and other control characters with spaces.
pub fn sanitize_line(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Collapse runs of whitespace (including newlines) into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}
