//! Find/replace over document trees.

use quarry_query::escape_html;
use quarry_tree::{NodeId, NodeKind, Tree};
use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::{error::SearchError, request::SearchMethod};

/// Rewrites matched text with a replacement.
#[derive(Debug)]
pub enum Replacer {
    /// Replaces every literal occurrence of a keyword.
    Literal {
        /// Text to find.
        keyword: String,
        /// HTML-escaped keyword, used inside inline code marks.
        escaped: String,
        /// Replacement text.
        replacement: String,
    },
    /// Replaces every regex match. `None` when the pattern failed to compile, in which case
    /// text is left as is.
    Pattern {
        /// Compiled pattern.
        re: Option<Regex>,
        /// Pattern compiled from the HTML-escaped keyword, used inside inline code marks.
        code_re: Option<Regex>,
        /// Replacement text, with `$n` group references.
        replacement: String,
    },
}

/// Compiles a case-sensitive pattern, logging failures.
fn compile(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).build() {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern, error = %e, "invalid replace pattern; leaving text unchanged");
            None
        }
    }
}

impl Replacer {
    /// Creates a replacer for a search method.
    ///
    /// Only keyword and regex replacement are supported.
    pub fn new(keyword: &str, replacement: &str, method: SearchMethod) -> Result<Self, SearchError> {
        match method {
            SearchMethod::Keyword => Ok(Self::Literal {
                keyword: keyword.to_string(),
                escaped: escape_html(keyword),
                replacement: replacement.to_string(),
            }),
            SearchMethod::Regex => {
                let re = compile(keyword);
                let escaped = escape_html(keyword);
                let code_re = if escaped == keyword {
                    re.clone()
                } else {
                    compile(&escaped)
                };
                Ok(Self::Pattern {
                    re,
                    code_re,
                    replacement: replacement.to_string(),
                })
            }
            SearchMethod::QuerySyntax | SearchMethod::Passthrough => {
                Err(SearchError::UnsupportedReplaceMethod {
                    method: method.name(),
                })
            }
        }
    }

    /// Replaces matches in ordinary text.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Literal {
                keyword,
                replacement,
                ..
            } => text.replace(keyword.as_str(), replacement),
            Self::Pattern {
                re: Some(re),
                replacement,
                ..
            } => re.replace_all(text, replacement.as_str()).into_owned(),
            Self::Pattern { re: None, .. } => text.to_string(),
        }
    }

    /// Replaces matches in inline code, whose text is stored HTML-escaped.
    ///
    /// Both keywords and patterns are escaped before matching.
    pub fn apply_code(&self, text: &str) -> String {
        match self {
            Self::Literal {
                escaped,
                replacement,
                ..
            } => text.replace(escaped.as_str(), replacement),
            Self::Pattern {
                code_re: Some(re),
                replacement,
                ..
            } => re.replace_all(text, replacement.as_str()).into_owned(),
            Self::Pattern { code_re: None, .. } => text.to_string(),
        }
    }
}

/// Replaces text in one node. Returns the new title when `node` is a document whose title
/// matched; the tree's title itself is left for the rename step.
fn replace_in_node(tree: &mut Tree, node: NodeId, replacer: &Replacer) -> Option<String> {
    if matches!(tree.node(node).kind, NodeKind::Document) {
        let title = tree.title();
        let renamed = replacer.apply(title);
        return (renamed != title).then_some(renamed);
    }

    match &mut tree.node_mut(node).kind {
        NodeKind::Text { text } | NodeKind::LinkText { text } => *text = replacer.apply(text),
        NodeKind::LinkDest { dest } => *dest = replacer.apply(dest),
        NodeKind::LinkTitle { title } => *title = replacer.apply(title),
        NodeKind::CodeBlock { code, .. } => *code = replacer.apply(code),
        NodeKind::MathBlock { content } => *content = replacer.apply(content),
        NodeKind::TextMark(mark) => {
            if mark.has_type("code") {
                mark.text = replacer.apply_code(&mark.text);
            }
            mark.text = replacer.apply(&mark.text);
            mark.inline_math = replacer.apply(&mark.inline_math);
            mark.inline_memo = replacer.apply(&mark.inline_memo);
            mark.a_title = replacer.apply(&mark.a_title);
            mark.a_href = replacer.apply(&mark.a_href);
        }
        _ => {}
    }
    None
}

/// Replaces text throughout the subtree rooted at `node`.
///
/// Returns the new document title when the subtree's root is the document and its title
/// matched.
pub fn replace_in_subtree(tree: &mut Tree, node: NodeId, replacer: &Replacer) -> Option<String> {
    let mut title = None;
    for id in tree.descendants(node) {
        if let Some(t) = replace_in_node(tree, id, replacer) {
            title = Some(t);
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use quarry_tree::TextMark;

    use super::*;

    /// Tree with a paragraph of mixed inline content.
    fn sample() -> (Tree, NodeId) {
        let mut tree = Tree::new("doc", "box", "/doc.sy", "/foo notes");
        tree.set_title("foo notes");
        let root = tree.root();
        let p = tree.append_new(root, NodeKind::Paragraph, Some("p"));
        tree.append_new(p, NodeKind::text("foo and foo"), None);
        let link = tree.append_new(p, NodeKind::Link, None);
        tree.append_new(link, NodeKind::LinkText { text: "foo".into() }, None);
        tree.append_new(
            link,
            NodeKind::LinkDest {
                dest: "https://foo.example".into(),
            },
            None,
        );
        let mut a = TextMark::new("a", "foo site");
        a.a_href = "https://foo.example".into();
        a.a_title = "foo".into();
        tree.append_new(p, NodeKind::TextMark(a), None);
        tree.append_new(
            root,
            NodeKind::CodeBlock {
                info: String::new(),
                code: "let foo = 1;".into(),
            },
            Some("c"),
        );
        (tree, p)
    }

    /// Kinds of the paragraph's descendants.
    fn kinds(tree: &Tree, p: NodeId) -> Vec<NodeKind> {
        tree.descendants(p)
            .into_iter()
            .skip(1)
            .map(|n| tree.node(n).kind.clone())
            .collect()
    }

    #[test]
    fn test_literal_replace_all_text_fields() {
        let (mut tree, p) = sample();
        let replacer = Replacer::new("foo", "bar", SearchMethod::Keyword).unwrap();
        assert!(replace_in_subtree(&mut tree, p, &replacer).is_none());

        let kinds = kinds(&tree, p);
        assert_eq!(kinds[0], NodeKind::text("bar and bar"));
        assert_eq!(kinds[2], NodeKind::LinkText { text: "bar".into() });
        assert_eq!(
            kinds[3],
            NodeKind::LinkDest {
                dest: "https://bar.example".into()
            }
        );
        let NodeKind::TextMark(ref a) = kinds[4] else {
            panic!("expected text mark");
        };
        assert_eq!(a.text, "bar site");
        assert_eq!(a.a_href, "https://bar.example");
        assert_eq!(a.a_title, "bar");
    }

    #[test]
    fn test_document_title_collected_not_applied() {
        let (mut tree, _) = sample();
        let root = tree.root();
        let replacer = Replacer::new("foo", "bar", SearchMethod::Keyword).unwrap();
        let title = replace_in_subtree(&mut tree, root, &replacer);
        assert_eq!(title.as_deref(), Some("bar notes"));
        assert_eq!(tree.title(), "foo notes");
        let code = tree.find_block("c").unwrap();
        assert_eq!(
            tree.node(code).kind,
            NodeKind::CodeBlock {
                info: String::new(),
                code: "let bar = 1;".into()
            }
        );
    }

    #[test]
    fn test_code_mark_matches_escaped_keyword() {
        let mut tree = Tree::new("doc", "box", "/doc.sy", "/Doc");
        let root = tree.root();
        let p = tree.append_new(root, NodeKind::Paragraph, Some("p"));
        tree.append_new(p, NodeKind::TextMark(TextMark::new("code", "a &lt; b")), None);

        let replacer = Replacer::new("<", "&gt;", SearchMethod::Keyword).unwrap();
        replace_in_subtree(&mut tree, p, &replacer);
        assert_eq!(
            kinds(&tree, p),
            vec![NodeKind::TextMark(TextMark::new("code", "a &gt; b"))]
        );
    }

    #[test]
    fn test_code_mark_matches_escaped_pattern() {
        let mut tree = Tree::new("doc", "box", "/doc.sy", "/Doc");
        let root = tree.root();
        let p = tree.append_new(root, NodeKind::Paragraph, Some("p"));
        tree.append_new(p, NodeKind::TextMark(TextMark::new("code", "x a&lt;b y")), None);

        let replacer = Replacer::new("a<b", "c", SearchMethod::Regex).unwrap();
        replace_in_subtree(&mut tree, p, &replacer);
        assert_eq!(
            kinds(&tree, p),
            vec![NodeKind::TextMark(TextMark::new("code", "x c y"))]
        );
    }

    #[test]
    fn test_regex_replace_with_groups() {
        let replacer = Replacer::new(r"(\d+)px", "${1}em", SearchMethod::Regex).unwrap();
        assert_eq!(replacer.apply("12px and 4px"), "12em and 4em");
    }

    #[test]
    fn test_invalid_regex_leaves_text() {
        let replacer = Replacer::new("(unclosed", "x", SearchMethod::Regex).unwrap();
        assert_eq!(replacer.apply("(unclosed"), "(unclosed");
        assert_eq!(replacer.apply_code("(unclosed"), "(unclosed");
    }

    #[test]
    fn test_unsupported_methods_rejected() {
        for method in [SearchMethod::QuerySyntax, SearchMethod::Passthrough] {
            let err = Replacer::new("a", "b", method).unwrap_err();
            assert!(matches!(err, SearchError::UnsupportedReplaceMethod { .. }));
        }
    }
}
