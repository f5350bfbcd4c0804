//! Sanitizing and quoting of raw query text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Block IDs: a 14 digit timestamp, a dash and 7 lowercase alphanumerics.
static BLOCK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{14}-[0-9a-z]{7}$").expect("block id pattern should compile"));

/// Zero-width and byte-order characters that never carry meaning in a query.
const INVISIBLE: [char; 5] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Strips invisible characters.
pub fn remove_invisible(text: &str) -> String {
    text.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

/// Checks whether `text` is exactly a block ID.
pub fn is_block_id(text: &str) -> bool {
    BLOCK_ID.is_match(text)
}

/// Turns free text into an FTS expression of quoted phrases.
///
/// Embedded double quotes are doubled, the text is split on single spaces and every piece
/// is wrapped in double quotes. Runs of spaces produce empty phrases, which FTS ignores.
pub fn phrase_query(text: &str) -> String {
    let escaped = text.replace('"', "\"\"");
    escaped
        .split(' ')
        .map(|part| format!("\"{}\"", part.trim()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escapes regex metacharacters so the text matches literally.
pub fn regex_escape(text: &str) -> String {
    regex::escape(text)
}

/// Escapes text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
