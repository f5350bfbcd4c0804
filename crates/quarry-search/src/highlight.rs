//! Highlight injection into document trees.
//!
//! Matched keywords in text and text-mark nodes are rewritten into typed spans. The
//! rewritten markup is parsed back into inline nodes, which are inserted before the original
//! node; the original is queued for unlinking so the caller can detach it once its walk is
//! over.

use quarry_query::{
    CONTENT_MAX_LEN, MARK_END, MARK_START, SEARCH_MARK_TYPE, SPAN_END, enclose_highlighting,
    escape_html, mark_replace_span_with_split, max_content, span_start,
};
use quarry_tree::{InlineParser, NodeId, NodeKind, TextMark, Tree, WalkStatus};

use crate::block::MentionPreview;

/// Mark types whose text is never highlighted.
const EXEMPT_MARK_TYPES: [&str; 2] = ["inline-math", "inline-memo"];

/// Highlights `keywords` inside one text or text-mark node.
///
/// Returns true when the node was rewritten. Replaced nodes (and a text mark's trailing
/// span IAL) are pushed to `unlinks`; the tree still contains them until the caller unlinks.
pub fn mark_replace_span(
    tree: &mut Tree,
    node: NodeId,
    keywords: &[String],
    span_type: &str,
    parser: &dyn InlineParser,
    case_sensitive: bool,
    unlinks: &mut Vec<NodeId>,
) -> bool {
    match tree.node(node).kind.clone() {
        NodeKind::Text { text } => {
            let marked = enclose_highlighting(
                &text,
                keywords,
                &span_start(span_type),
                SPAN_END,
                case_sensitive,
            );
            if marked == text {
                return false;
            }
            for kind in parser.parse_inline(&marked, span_type) {
                let child = tree.new_node(kind, None);
                tree.insert_before(node, child);
            }
            unlinks.push(node);
            true
        }
        NodeKind::TextMark(mark) => {
            if EXEMPT_MARK_TYPES.iter().any(|t| mark.has_type(t)) {
                return false;
            }
            let start = span_start(&format!("{} {span_type}", mark.types));
            let marked =
                enclose_highlighting(&mark.text, keywords, &start, SPAN_END, case_sensitive);
            if marked == mark.text {
                return false;
            }
            split_text_mark(tree, node, &mark, &marked, span_type, parser);
            unlinks.push(node);
            if let Some(ial) = trailing_span_ial(tree, node) {
                unlinks.push(ial);
            }
            true
        }
        _ => false,
    }
}

/// Returns the span IAL directly following `node`, if any.
fn trailing_span_ial(tree: &Tree, node: NodeId) -> Option<NodeId> {
    tree.next_sibling(node)
        .filter(|n| matches!(tree.node(*n).kind, NodeKind::KramdownSpanIal { .. }))
}

/// Inserts the pieces of a highlighted text mark before it.
///
/// Every piece keeps the original mark's semantics and attributes, and is followed by a
/// copy of the original's trailing span IAL.
fn split_text_mark(
    tree: &mut Tree,
    node: NodeId,
    mark: &TextMark,
    marked: &str,
    span_type: &str,
    parser: &dyn InlineParser,
) {
    let ial = tree.node(node).ial.clone();
    let trailing = trailing_span_ial(tree, node).map(|n| tree.node(n).clone());

    for kind in parser.parse_inline(marked, span_type) {
        let mut piece = match kind {
            NodeKind::TextMark(piece) => piece,
            NodeKind::Text { text } => TextMark::new(mark.types.clone(), text),
            other => {
                let child = tree.new_node(other, None);
                tree.insert_before(node, child);
                continue;
            }
        };
        mark.copy_semantics_to(&mut piece);
        let child = tree.new_node(NodeKind::TextMark(piece), None);
        tree.node_mut(child).ial.clone_from(&ial);
        tree.insert_before(node, child);

        if let Some(ref trailing) = trailing {
            let copy = tree.new_node(trailing.kind.clone(), None);
            tree.node_mut(copy).ial.clone_from(&trailing.ial);
            tree.insert_before(node, copy);
        }
    }
}

/// Highlights `keywords` across a whole tree with `span_type` spans.
///
/// Returns the number of rewritten nodes.
pub fn highlight_tree(
    tree: &mut Tree,
    keywords: &[String],
    span_type: &str,
    parser: &dyn InlineParser,
    case_sensitive: bool,
) -> usize {
    let mut targets = Vec::new();
    tree.walk(tree.root(), |id, node| {
        if matches!(node.kind, NodeKind::Text { .. } | NodeKind::TextMark(_)) {
            targets.push(id);
        }
        WalkStatus::Continue
    });

    let mut unlinks = Vec::new();
    let mut rewritten = 0;
    for id in targets {
        if mark_replace_span(tree, id, keywords, span_type, parser, case_sensitive, &mut unlinks) {
            rewritten += 1;
        }
    }
    for id in unlinks {
        tree.unlink(id);
    }
    rewritten
}

/// Highlights search keywords across a tree with the search mark span type.
pub fn highlight_search(
    tree: &mut Tree,
    keywords: &[String],
    parser: &dyn InlineParser,
    case_sensitive: bool,
) -> usize {
    highlight_tree(tree, keywords, SEARCH_MARK_TYPE, parser, case_sensitive)
}

/// Marks `keywords` in the text of every leaf block, for mention previews.
///
/// Highlights ending inside a word are undone. Blocks left without a highlight are skipped.
pub fn mention_previews(
    tree: &Tree,
    keywords: &[String],
    case_sensitive: bool,
) -> Vec<MentionPreview> {
    let escaped: Vec<String> = keywords.iter().map(|k| escape_html(k)).collect();
    tree.descendants(tree.root())
        .into_iter()
        .filter_map(|id| {
            let node = tree.node(id);
            if !node.kind.is_block() || node.kind.is_container() {
                return None;
            }
            let block_id = node.id.clone()?;
            let text = escape_html(&tree.text_content(id));
            let marked =
                mark_replace_span_with_split(&text, &escaped, MARK_START, MARK_END, case_sensitive);
            marked.contains(MARK_START).then(|| MentionPreview {
                id: block_id,
                content: max_content(&marked, CONTENT_MAX_LEN),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use quarry_tree::SpanMarkParser;

    use super::*;

    /// Returns the inline children of the first paragraph.
    fn paragraph_children(tree: &Tree) -> Vec<NodeKind> {
        let root = tree.root();
        let p = tree.first_child(root).unwrap();
        tree.children(p)
            .into_iter()
            .map(|c| tree.node(c).kind.clone())
            .collect()
    }

    /// Tree holding one paragraph with the given inline kinds.
    fn tree_with(inlines: Vec<NodeKind>) -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new("doc", "box", "/doc.sy", "/Doc");
        let root = tree.root();
        let p = tree.append_new(root, NodeKind::Paragraph, Some("20230101120000-ppppppp"));
        let ids = inlines
            .into_iter()
            .map(|k| tree.append_new(p, k, None))
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_text_node_split() {
        let (mut tree, _) = tree_with(vec![NodeKind::text("My ABC Note")]);
        let n = highlight_search(&mut tree, &["abc".to_string()], &SpanMarkParser, false);
        assert_eq!(n, 1);
        assert_eq!(
            paragraph_children(&tree),
            vec![
                NodeKind::text("My "),
                NodeKind::TextMark(TextMark::new("search-mark", "ABC")),
                NodeKind::text(" Note"),
            ]
        );
    }

    #[test]
    fn test_unmatched_text_untouched() {
        let (mut tree, ids) = tree_with(vec![NodeKind::text("nothing")]);
        let mut unlinks = Vec::new();
        let changed = mark_replace_span(
            &mut tree,
            ids[0],
            &["zzz".to_string()],
            SEARCH_MARK_TYPE,
            &SpanMarkParser,
            false,
            &mut unlinks,
        );
        assert!(!changed);
        assert!(unlinks.is_empty());
        assert_eq!(paragraph_children(&tree), vec![NodeKind::text("nothing")]);
    }

    #[test]
    fn test_unlink_deferred_to_caller() {
        let (mut tree, ids) = tree_with(vec![NodeKind::text("abc")]);
        let mut unlinks = Vec::new();
        mark_replace_span(
            &mut tree,
            ids[0],
            &["abc".to_string()],
            SEARCH_MARK_TYPE,
            &SpanMarkParser,
            true,
            &mut unlinks,
        );
        assert_eq!(unlinks, vec![ids[0]]);
        // Original still attached after the new piece.
        assert_eq!(paragraph_children(&tree).len(), 2);
    }

    #[test]
    fn test_link_mark_keeps_semantics() {
        let mut link = TextMark::new("a", "visit example now");
        link.a_href = "https://example.com".into();
        let (mut tree, _) = tree_with(vec![NodeKind::TextMark(link)]);

        highlight_search(&mut tree, &["example".to_string()], &SpanMarkParser, true);
        let children = paragraph_children(&tree);
        assert_eq!(children.len(), 3);
        let marks: Vec<TextMark> = children
            .into_iter()
            .map(|k| match k {
                NodeKind::TextMark(m) => m,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(marks[0].types, "a");
        assert_eq!(marks[0].text, "visit ");
        assert_eq!(marks[1].types, "a search-mark");
        assert_eq!(marks[1].text, "example");
        assert!(marks.iter().all(|m| m.a_href == "https://example.com"));
    }

    #[test]
    fn test_trailing_ial_copied_to_each_piece() {
        let ial = NodeKind::KramdownSpanIal {
            tokens: "{: style=\"color: red\"}".into(),
        };
        let (mut tree, _) = tree_with(vec![
            NodeKind::TextMark(TextMark::new("strong", "ab cd")),
            ial.clone(),
            NodeKind::text("tail"),
        ]);
        highlight_search(&mut tree, &["cd".to_string()], &SpanMarkParser, true);
        assert_eq!(
            paragraph_children(&tree),
            vec![
                NodeKind::TextMark(TextMark::new("strong", "ab ")),
                ial.clone(),
                NodeKind::TextMark(TextMark::new("strong search-mark", "cd")),
                ial,
                NodeKind::text("tail"),
            ]
        );
    }

    #[test]
    fn test_literal_span_markup_stays_text() {
        let literal = r#"a <span data-type="strong">b</span> "#;
        let (mut tree, _) = tree_with(vec![NodeKind::text(format!("{literal}abc"))]);
        highlight_search(&mut tree, &["abc".to_string()], &SpanMarkParser, true);
        assert_eq!(
            paragraph_children(&tree),
            vec![
                NodeKind::text(literal),
                NodeKind::TextMark(TextMark::new("search-mark", "abc")),
            ]
        );
    }

    #[test]
    fn test_inline_math_and_memo_exempt() {
        let (mut tree, _) = tree_with(vec![
            NodeKind::TextMark(TextMark::new("inline-math", "abc")),
            NodeKind::TextMark(TextMark::new("inline-memo", "abc")),
        ]);
        assert_eq!(
            highlight_search(&mut tree, &["abc".to_string()], &SpanMarkParser, true),
            0
        );
        assert_eq!(paragraph_children(&tree).len(), 2);
    }

    #[test]
    fn test_block_ref_semantics_copied() {
        let mut r = TextMark::new("block-ref", "see target");
        r.block_ref_id = "20230101120000-ttttttt".into();
        r.block_ref_subtype = "s".into();
        let (mut tree, _) = tree_with(vec![NodeKind::TextMark(r)]);
        highlight_search(&mut tree, &["target".to_string()], &SpanMarkParser, true);
        for kind in paragraph_children(&tree) {
            let NodeKind::TextMark(m) = kind else {
                panic!("expected text mark");
            };
            assert_eq!(m.block_ref_id, "20230101120000-ttttttt");
            assert_eq!(m.block_ref_subtype, "s");
        }
    }

    #[test]
    fn test_mention_previews_skip_word_fragments() {
        let mut tree = Tree::new("doc", "box", "/doc.sy", "/Doc");
        let root = tree.root();
        let h = tree.append_new(root, NodeKind::Heading { level: 1 }, Some("h"));
        tree.append_new(h, NodeKind::text("Rust notes"), None);
        let quote = tree.append_new(root, NodeKind::Blockquote, Some("q"));
        let p = tree.append_new(quote, NodeKind::Paragraph, Some("p"));
        tree.append_new(p, NodeKind::text("rusty <rust> tools"), None);
        let other = tree.append_new(root, NodeKind::Paragraph, Some("o"));
        tree.append_new(other, NodeKind::text("trusted"), None);

        let previews = mention_previews(&tree, &["rust".to_string()], false);
        assert_eq!(
            previews,
            vec![
                MentionPreview {
                    id: "h".into(),
                    content: "<mark>Rust</mark> notes".into(),
                },
                MentionPreview {
                    id: "p".into(),
                    content: "rusty &lt;<mark>rust</mark>&gt; tools".into(),
                },
            ]
        );
    }
}
