//! Inline re-parsing of highlighted text.
//!
//! Highlighting wraps keyword occurrences in `<span data-type="...">` markup. An
//! [`InlineParser`] turns such text back into inline nodes so the tree never holds raw
//! markup inside a text node.

use std::mem;

use crate::node::{NodeKind, TextMark};

/// Opening prefix of a typed span.
const SPAN_OPEN: &str = "<span data-type=\"";

/// Closing tag of a typed span.
const SPAN_CLOSE: &str = "</span>";

/// Parses inline markup into a flat run of inline nodes.
pub trait InlineParser {
    /// Parses `text` into inline node kinds, in order.
    ///
    /// Only spans whose types include `span_type` are markup; anything else is text.
    fn parse_inline(&self, text: &str, span_type: &str) -> Vec<NodeKind>;
}

/// Parser for plain text interleaved with `<span data-type="types">text</span>` runs.
///
/// Each span carrying the requested type becomes a [`TextMark`] whose types are the
/// `data-type` value; the text between spans becomes [`NodeKind::Text`]. Spans do not nest.
/// Spans of other types and markup that does not close are kept as literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanMarkParser;

impl InlineParser for SpanMarkParser {
    fn parse_inline(&self, text: &str, span_type: &str) -> Vec<NodeKind> {
        let mut out = Vec::new();
        let mut plain = String::new();
        let mut rest = text;

        while let Some(start) = rest.find(SPAN_OPEN) {
            let open_end = start + SPAN_OPEN.len();
            let after_open = &rest[open_end..];
            let Some(types_end) = after_open.find("\">") else {
                break;
            };
            if !after_open[..types_end]
                .split_whitespace()
                .any(|t| t == span_type)
            {
                plain.push_str(&rest[..open_end]);
                rest = after_open;
                continue;
            }
            let body = &after_open[types_end + 2..];
            let Some(close) = body.find(SPAN_CLOSE) else {
                break;
            };

            plain.push_str(&rest[..start]);
            flush_text(&mut plain, &mut out);
            out.push(NodeKind::TextMark(TextMark::new(
                &after_open[..types_end],
                &body[..close],
            )));
            rest = &body[close + SPAN_CLOSE.len()..];
        }

        plain.push_str(rest);
        flush_text(&mut plain, &mut out);
        out
    }
}

/// Emits accumulated plain text as a text node.
fn flush_text(plain: &mut String, out: &mut Vec<NodeKind>) {
    if !plain.is_empty() {
        out.push(NodeKind::text(mem::take(plain)));
    }
}
