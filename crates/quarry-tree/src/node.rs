//! Node kinds and arena entries for document trees.
//!
//! Every node kind is a variant of the closed [`NodeKind`] enum. Block-level kinds carry a
//! block ID (stored on [`Node`]), inline kinds carry their text payloads directly.

use serde::{Deserialize, Serialize};

/// Index of a node inside its owning [`Tree`](crate::Tree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a typed inline text mark (`<span data-type="...">`).
///
/// `types` is a space separated list, e.g. `"strong a"`. Only the fields relevant to the
/// listed types are populated; the rest stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMark {
    /// Space separated mark types.
    pub types: String,
    /// Visible text.
    pub text: String,
    /// Link target for `a` marks.
    pub a_href: String,
    /// Link title for `a` marks.
    pub a_title: String,
    /// Formula for `inline-math` marks.
    pub inline_math: String,
    /// Memo text for `inline-memo` marks.
    pub inline_memo: String,
    /// Target block for `block-ref` marks.
    pub block_ref_id: String,
    /// Reference subtype (`s` static, `d` dynamic) for `block-ref` marks.
    pub block_ref_subtype: String,
    /// Target annotation for `file-annotation-ref` marks.
    pub file_annotation_ref_id: String,
}

impl TextMark {
    /// Creates a mark with the given types and text.
    pub fn new(types: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            types: types.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Checks whether `kind` is one of this mark's types.
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.split_whitespace().any(|t| t == kind)
    }

    /// Copies the semantic attributes of `self` (link, block reference, file annotation)
    /// onto `target`, according to `self`'s types.
    pub fn copy_semantics_to(&self, target: &mut Self) {
        if self.has_type("a") {
            target.a_href.clone_from(&self.a_href);
            target.a_title.clone_from(&self.a_title);
        } else if self.has_type("block-ref") {
            target.block_ref_id.clone_from(&self.block_ref_id);
            target.block_ref_subtype.clone_from(&self.block_ref_subtype);
        } else if self.has_type("file-annotation-ref") {
            target
                .file_annotation_ref_id
                .clone_from(&self.file_annotation_ref_id);
        }
    }
}

/// The closed set of node kinds a document tree may contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Tree root. The document title lives in the `title` attribute.
    Document,
    /// Heading of level 1-6.
    Heading {
        /// Heading level.
        level: u8,
    },
    /// Paragraph.
    Paragraph,
    /// List container.
    List,
    /// Single list item.
    ListItem,
    /// Blockquote container.
    Blockquote,
    /// Layout container holding other blocks.
    SuperBlock,
    /// Fenced code block.
    CodeBlock {
        /// Info string (language).
        info: String,
        /// Raw code.
        code: String,
    },
    /// Display math block.
    MathBlock {
        /// Raw formula.
        content: String,
    },
    /// Table.
    Table,
    /// Raw HTML block.
    HtmlBlock {
        /// Raw markup.
        html: String,
    },
    /// Embedded query block.
    QueryEmbed {
        /// The embedded statement.
        stmt: String,
    },
    /// Plain text run.
    Text {
        /// Text payload.
        text: String,
    },
    /// Inline link. Holds `LinkText`, `LinkDest` and `LinkTitle` children.
    Link,
    /// Visible text of a link.
    LinkText {
        /// Text payload.
        text: String,
    },
    /// Link destination.
    LinkDest {
        /// URL payload.
        dest: String,
    },
    /// Link title.
    LinkTitle {
        /// Title payload.
        title: String,
    },
    /// Typed inline mark.
    TextMark(TextMark),
    /// Inline attribute list trailing an inline node, e.g. `{: style="color: red"}`.
    KramdownSpanIal {
        /// Raw attribute list tokens.
        tokens: String,
    },
}

impl NodeKind {
    /// Creates a plain text node kind.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Returns true for block-level kinds, which carry a block ID.
    pub fn is_block(&self) -> bool {
        self.type_code().is_some()
    }

    /// Returns true for container blocks, whose content lives in child blocks.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Document | Self::List | Self::ListItem | Self::Blockquote | Self::SuperBlock
        )
    }

    /// Returns the block type code used in the block store (`d`, `h`, `p`, ...).
    ///
    /// Inline kinds have no code.
    pub fn type_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Document => "d",
            Self::Heading { .. } => "h",
            Self::Paragraph => "p",
            Self::List => "l",
            Self::ListItem => "i",
            Self::Blockquote => "b",
            Self::SuperBlock => "s",
            Self::CodeBlock { .. } => "c",
            Self::MathBlock { .. } => "m",
            Self::Table => "t",
            Self::HtmlBlock { .. } => "html",
            Self::QueryEmbed { .. } => "query_embed",
            _ => return None,
        };
        Some(code)
    }

    /// Returns the text carried directly by this node, if any.
    pub fn own_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } | Self::LinkText { text } => Some(text),
            Self::CodeBlock { code, .. } => Some(code),
            Self::MathBlock { content } => Some(content),
            Self::HtmlBlock { html } => Some(html),
            Self::TextMark(mark) => Some(&mark.text),
            _ => None,
        }
    }
}

/// A node stored in a tree arena, with its structural links.
#[derive(Debug, Clone)]
pub struct Node {
    /// What the node is.
    pub kind: NodeKind,
    /// Block ID, for block-level nodes.
    pub id: Option<String>,
    /// Inline attribute list, as ordered key/value pairs.
    pub ial: Vec<(String, String)>,
    /// Parent node.
    pub(crate) parent: Option<NodeId>,
    /// First child.
    pub(crate) first_child: Option<NodeId>,
    /// Last child.
    pub(crate) last_child: Option<NodeId>,
    /// Previous sibling.
    pub(crate) prev: Option<NodeId>,
    /// Next sibling.
    pub(crate) next: Option<NodeId>,
}

impl Node {
    /// Creates a detached node.
    pub(crate) fn new(kind: NodeKind, id: Option<String>) -> Self {
        Self {
            kind,
            id,
            ial: Vec::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        }
    }

    /// Looks up an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.ial
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing an existing value or appending a new pair.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(pair) = self.ial.iter_mut().find(|(k, _)| k == key) {
            pair.1 = value;
        } else {
            self.ial.push((key.to_string(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        assert_eq!(NodeKind::Document.type_code(), Some("d"));
        assert_eq!(NodeKind::Heading { level: 2 }.type_code(), Some("h"));
        assert_eq!(
            NodeKind::QueryEmbed {
                stmt: String::new()
            }
            .type_code(),
            Some("query_embed")
        );
        assert_eq!(NodeKind::text("x").type_code(), None);
        assert!(!NodeKind::Link.is_block());
    }

    #[test]
    fn test_text_mark_types() {
        let mark = TextMark::new("strong a", "hello");
        assert!(mark.has_type("a"));
        assert!(mark.has_type("strong"));
        assert!(!mark.has_type("em"));
    }

    #[test]
    fn test_copy_semantics_link() {
        let mut link = TextMark::new("a", "site");
        link.a_href = "https://example.com".into();
        link.a_title = "Example".into();

        let mut child = TextMark::new("a search-mark", "si");
        link.copy_semantics_to(&mut child);
        assert_eq!(child.a_href, "https://example.com");
        assert_eq!(child.a_title, "Example");
        assert!(child.block_ref_id.is_empty());
    }

    #[test]
    fn test_copy_semantics_block_ref() {
        let mut r = TextMark::new("block-ref", "target");
        r.block_ref_id = "20230101120000-abcdefg".into();
        r.block_ref_subtype = "d".into();

        let mut child = TextMark::default();
        r.copy_semantics_to(&mut child);
        assert_eq!(child.block_ref_id, "20230101120000-abcdefg");
        assert_eq!(child.block_ref_subtype, "d");
    }

    #[test]
    fn test_node_attrs() {
        let mut node = Node::new(NodeKind::Document, Some("x".into()));
        assert_eq!(node.attr("title"), None);
        node.set_attr("title", "One");
        node.set_attr("title", "Two");
        assert_eq!(node.attr("title"), Some("Two"));
        assert_eq!(node.ial.len(), 1);
    }
}
