//! Character-safe text helpers.
//!
//! Every length the assembler reports or truncates to is measured in
//! characters, so slicing never lands inside a multi-byte sequence.

/// Return the prefix of `s` holding at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}

/// Truncate to `max_chars` characters and append `marker` only if something was cut.
pub fn truncate_with_marker(s: &str, max_chars: usize, marker: &str) -> String {
    let prefix = truncate_chars(s, max_chars);
    if prefix.len() < s.len() {
        format!("{prefix}{marker}")
    } else {
        prefix.to_string()
    }
}

/// Number of characters in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Case-insensitive substring test against a set of lowercase needles.
pub fn contains_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack_lower.contains(needle))
}
