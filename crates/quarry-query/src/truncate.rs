//! Rune-bounded truncation of highlighted content.

use crate::mark::{MARK_END, MARK_START};

/// Maximum characters kept for block content and markdown.
pub const CONTENT_MAX_LEN: usize = 5120;

/// Relocation only applies to limits above this many characters.
const RELOCATE_MIN_LEN: usize = 128;

/// Most characters examined when walking back from a late highlight.
const RELOCATE_WALK_MAX: usize = 512;

/// Most characters of leading context kept before a relocated highlight.
const RELOCATE_KEEP_MAX: usize = 64;

/// Cuts `text` to at most `max_len` characters, appending `...` when cut.
pub fn truncate_runes(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

/// Bounds highlighted content to `max_len` characters without losing the first highlight.
///
/// When the first `<mark>` starts at or beyond `max_len`, the leading text is dropped except
/// for a short run of context before the mark. Whatever is still too long is then cut and
/// suffixed with `...`; a mark tag split by the cut is removed and an open `<mark>` is closed.
/// Text without marks is cut with [`truncate_runes`].
pub fn max_content(content: &str, max_len: usize) -> String {
    if !content.contains(MARK_START) {
        return truncate_runes(content, max_len);
    }
    let mut content = content.to_string();

    if RELOCATE_MIN_LEN < max_len
        && let Some(idx) = content.find(MARK_START)
        && max_len <= content[..idx].chars().count()
    {
        let keep = content[..idx]
            .chars()
            .rev()
            .take(RELOCATE_WALK_MAX.min(RELOCATE_KEEP_MAX + 1))
            .count();
        let start = content[..idx]
            .char_indices()
            .rev()
            .nth(keep - 1)
            .map_or(idx, |(byte, _)| byte);
        content = content[start..].to_string();
    }

    if content.chars().count() <= max_len {
        return content;
    }
    let Some((cut, _)) = content.char_indices().nth(max_len) else {
        return content;
    };
    let mut head = content[..cut].to_string();
    drop_partial_tag(&mut head);
    if head.matches(MARK_START).count() > head.matches(MARK_END).count() {
        head.push_str(MARK_END);
    }
    head.push_str("...");
    head
}

/// Removes a trailing `<mark>` or `</mark>` split by the cut.
///
/// Any other `<` is content and stays.
fn drop_partial_tag(head: &mut String) {
    if let Some(open) = head.rfind('<') {
        let tail = &head[open..];
        if MARK_START.starts_with(tail) || MARK_END.starts_with(tail) {
            head.truncate(open);
        }
    }
}
