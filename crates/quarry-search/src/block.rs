//! Result entities returned to callers.

use std::collections::BTreeMap;

use quarry_tree::PathEntry;
use serde::Serialize;

/// A block as returned by searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Box (notebook) ID.
    #[serde(rename = "box")]
    pub box_id: String,
    /// Storage path of the owning document.
    pub path: String,
    /// Human readable path of the owning document.
    #[serde(rename = "hPath")]
    pub hpath: String,
    /// Block ID.
    pub id: String,
    /// Owning document ID.
    pub root_id: String,
    /// Parent block ID.
    pub parent_id: String,
    /// Block name.
    pub name: String,
    /// Block alias.
    pub alias: String,
    /// Block memo.
    pub memo: String,
    /// Block tags.
    pub tag: String,
    /// Display content, possibly highlighted.
    pub content: String,
    /// Content of the first child, for containers.
    pub fcontent: String,
    /// Markdown source.
    pub markdown: String,
    /// Attributes parsed from the block's IAL.
    pub ial: BTreeMap<String, String>,
    /// Block type code.
    #[serde(rename = "type")]
    pub kind: String,
    /// Block subtype.
    #[serde(rename = "subType")]
    pub sub_kind: String,
    /// Document-order sort key. Replaced with the content order when grouping by it.
    pub sort: i64,
    /// Creation timestamp.
    pub created: String,
    /// Last update timestamp.
    pub updated: String,
    /// Matching blocks of this document, when grouping by document.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
    /// Anchor text for references to this block.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_text: String,
    /// Relevance score. Lower sorts first.
    pub score: f64,
}

impl Block {
    /// Checks whether the block is a container (list, list item, blockquote, super block).
    pub fn is_container(&self) -> bool {
        matches!(self.kind.as_str(), "l" | "i" | "b" | "s")
    }
}

/// A block resolved from an embed query, with its breadcrumb.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedBlock {
    /// The block.
    pub block: Block,
    /// Breadcrumb from the document root down to the block.
    pub block_paths: Vec<PathEntry>,
}


/// A leaf block's text with keywords marked, for mention previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionPreview {
    /// Block ID.
    pub id: String,
    /// HTML-escaped text with `<mark>` highlights.
    pub content: String,
}
