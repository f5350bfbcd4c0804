//! Keyword marking.
//!
//! The full-text backend wraps matches in the sentinel pair [`SEARCH_MARK_LEFT`] /
//! [`SEARCH_MARK_RIGHT`]. Display text uses `<mark>` tags, and tree highlighting uses typed
//! spans built with [`span_start`] and [`SPAN_END`].

use std::cmp::Reverse;

use regex::{Captures, Regex, RegexBuilder};

use crate::text::escape_html;

/// Left sentinel emitted by the backend's `highlight()` and `snippet()`.
pub const SEARCH_MARK_LEFT: &str = "__@mark__";

/// Right sentinel emitted by the backend's `highlight()` and `snippet()`.
pub const SEARCH_MARK_RIGHT: &str = "__mark@__";

/// Separator between multiple keywords packed into one string.
pub const TERM_SEP: &str = "__term@sep__";

/// Span type used for search highlights inside trees.
pub const SEARCH_MARK_TYPE: &str = "search-mark";

/// Opening display highlight tag.
pub const MARK_START: &str = "<mark>";

/// Closing display highlight tag.
pub const MARK_END: &str = "</mark>";

/// Closing tag of a typed span.
pub const SPAN_END: &str = "</span>";

/// Returns the opening tag of a typed span.
pub fn span_start(data_type: &str) -> String {
    format!("<span data-type=\"{data_type}\">")
}

/// Splits a packed keyword string on [`TERM_SEP`], dropping empty pieces.
pub fn split_keywords(keyword: &str) -> Vec<String> {
    keyword
        .split(TERM_SEP)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds an alternation matching any of `keywords` literally, longest first.
fn keyword_regex<S: AsRef<str>>(keywords: &[S], case_sensitive: bool) -> Option<Regex> {
    let mut words: Vec<&str> = keywords
        .iter()
        .map(AsRef::as_ref)
        .filter(|k| !k.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by_key(|w| Reverse(w.chars().count()));
    words.dedup();

    let pattern = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .ok()
}

/// Wraps every occurrence of any keyword in `open` and `close`.
///
/// Longer keywords win over their prefixes. Text is returned unchanged when no keyword is
/// usable.
pub fn enclose_highlighting<S: AsRef<str>>(
    text: &str,
    keywords: &[S],
    open: &str,
    close: &str,
    case_sensitive: bool,
) -> String {
    let Some(re) = keyword_regex(keywords, case_sensitive) else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        format!("{open}{}{close}", &caps[0])
    })
    .into_owned()
}

/// HTML-escapes `text` and wraps keyword occurrences in `<mark>` tags.
///
/// `keyword` may pack several keywords joined by [`TERM_SEP`]. Returns the byte position of
/// the first mark in the escaped text (before any trimming), or `None` when nothing matched.
/// Leading context before the first mark is trimmed to `before_len` characters and prefixed
/// with `...` when cut.
pub fn mark_text(
    text: &str,
    keyword: &str,
    before_len: usize,
    case_sensitive: bool,
) -> (Option<usize>, String) {
    let escaped = escape_html(text);
    let keywords = split_keywords(keyword);
    if keywords.is_empty() {
        return (None, escaped);
    }

    let escaped_keywords: Vec<String> = keywords.iter().map(|k| escape_html(k)).collect();
    let marked = enclose_highlighting(
        &escaped,
        &escaped_keywords,
        MARK_START,
        MARK_END,
        case_sensitive,
    );
    let Some(pos) = marked.find(MARK_START) else {
        return (None, marked);
    };

    let before = &marked[..pos];
    let count = before.chars().count();
    if count <= before_len {
        return (Some(pos), marked);
    }
    let kept: String = before.chars().skip(count - before_len).collect();
    (Some(pos), format!("...{kept}{}", &marked[pos..]))
}

/// Converts backend sentinels into `<mark>` tags over HTML-escaped text.
pub fn sentinels_to_mark(text: &str) -> String {
    escape_html(text)
        .replace(SEARCH_MARK_LEFT, MARK_START)
        .replace(SEARCH_MARK_RIGHT, MARK_END)
}

/// Highlights keywords for mention previews, undoing highlights that end inside a word.
///
/// A highlight immediately followed by an ASCII letter is collapsed back to plain text.
pub fn mark_replace_span_with_split<S: AsRef<str>>(
    text: &str,
    keywords: &[S],
    start: &str,
    end: &str,
    case_sensitive: bool,
) -> String {
    let enclosed = enclose_highlighting(text, keywords, start, end, case_sensitive);
    let parts: Vec<&str> = enclosed.split(end).collect();
    let mut out = String::with_capacity(enclosed.len());
    for (i, part) in parts.iter().enumerate() {
        let Some(next) = parts.get(i + 1) else {
            out.push_str(part);
            break;
        };
        if next.as_bytes().first().is_some_and(u8::is_ascii_alphabetic) {
            out.push_str(&part.replace(start, ""));
            continue;
        }
        out.push_str(part);
        out.push_str(end);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclose_case_insensitive() {
        let out = enclose_highlighting("My ABC Note abc", &["abc"], "[", "]", false);
        assert_eq!(out, "My [ABC] Note [abc]");
    }

    #[test]
    fn test_enclose_case_sensitive() {
        let out = enclose_highlighting("My ABC Note abc", &["abc"], "[", "]", true);
        assert_eq!(out, "My ABC Note [abc]");
    }

    #[test]
    fn test_enclose_longest_first() {
        let out = enclose_highlighting("foobar foo", &["foo", "foobar"], "[", "]", true);
        assert_eq!(out, "[foobar] [foo]");
    }

    #[test]
    fn test_enclose_metacharacters_literal() {
        let out = enclose_highlighting("a+b a.b", &["a+b"], "[", "]", true);
        assert_eq!(out, "[a+b] a.b");
    }

    #[test]
    fn test_enclose_no_keywords() {
        let empty: [&str; 0] = [];
        assert_eq!(enclose_highlighting("text", &empty, "[", "]", true), "text");
        assert_eq!(enclose_highlighting("text", &[""], "[", "]", true), "text");
    }

    #[test]
    fn test_mark_text_escapes_html() {
        let (pos, marked) = mark_text("<b>abc</b>", "abc", 36, true);
        assert_eq!(pos, Some(9));
        assert_eq!(marked, "&lt;b&gt;<mark>abc</mark>&lt;/b&gt;");
    }

    #[test]
    fn test_mark_text_trims_leading_context() {
        let (pos, marked) = mark_text("0123456789 target", "target", 4, true);
        assert_eq!(pos, Some(11));
        assert_eq!(marked, "...789 <mark>target</mark>");
    }

    #[test]
    fn test_mark_text_multiple_keywords() {
        let keyword = format!("foo{TERM_SEP}bar");
        let (_, marked) = mark_text("foo and bar", &keyword, 36, true);
        assert_eq!(marked, "<mark>foo</mark> and <mark>bar</mark>");
    }

    #[test]
    fn test_mark_text_no_match() {
        let (pos, marked) = mark_text("a & b", "zzz", 36, true);
        assert_eq!(pos, None);
        assert_eq!(marked, "a &amp; b");
    }

    #[test]
    fn test_sentinels_to_mark() {
        let text = format!("x < {SEARCH_MARK_LEFT}ABC{SEARCH_MARK_RIGHT}");
        assert_eq!(sentinels_to_mark(&text), "x &lt; <mark>ABC</mark>");
    }

    #[test]
    fn test_split_preview_collapses_word_fragments() {
        let out = mark_replace_span_with_split("cat catalog cat.", &["cat"], "[", "]", true);
        assert_eq!(out, "[cat] catalog [cat].");
    }

    #[test]
    fn test_span_start() {
        assert_eq!(
            span_start(SEARCH_MARK_TYPE),
            "<span data-type=\"search-mark\">"
        );
    }
}
