//! Request and response types.
//!
//! Selector enums mirror the numeric codes used on the wire. Unknown codes fall back to
//! each selector's default.

use std::collections::HashMap;

use serde::Serialize;

use crate::block::Block;

/// How the query text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMethod {
    /// Whitespace separated keywords, each phrase-quoted.
    #[default]
    Keyword,
    /// Full-text query syntax passed to the match expression.
    QuerySyntax,
    /// A raw statement executed as given.
    Passthrough,
    /// A regular expression matched with `REGEXP`.
    Regex,
}

impl SearchMethod {
    /// Maps a wire code (0 keyword, 1 query syntax, 2 passthrough, 3 regex).
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::QuerySyntax,
            2 => Self::Passthrough,
            3 => Self::Regex,
            _ => Self::Keyword,
        }
    }

    /// Returns the method's display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::QuerySyntax => "query syntax",
            Self::Passthrough => "SQL",
            Self::Regex => "regex",
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// Document sort key ascending.
    #[default]
    Type,
    /// Creation time ascending.
    CreatedAsc,
    /// Creation time descending.
    CreatedDesc,
    /// Update time ascending.
    UpdatedAsc,
    /// Update time descending.
    UpdatedDesc,
    /// Position in the document tree. Only meaningful when grouping by document.
    ContentOrder,
    /// Full-text rank, best last.
    RelevanceAsc,
    /// Full-text rank, best first.
    RelevanceDesc,
}

impl OrderBy {
    /// Maps a wire code (0..=7).
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::CreatedAsc,
            2 => Self::CreatedDesc,
            3 => Self::UpdatedAsc,
            4 => Self::UpdatedDesc,
            5 => Self::ContentOrder,
            6 => Self::RelevanceAsc,
            7 => Self::RelevanceDesc,
            _ => Self::Type,
        }
    }

    /// Checks whether this ordering is computed by the backend's rank column.
    pub fn is_relevance(self) -> bool {
        matches!(self, Self::RelevanceAsc | Self::RelevanceDesc)
    }
}

/// Result grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupBy {
    /// Flat list.
    #[default]
    None,
    /// One entry per document with matching blocks as children.
    Document,
}

impl GroupBy {
    /// Maps a wire code (0 none, 1 by document).
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Document,
            _ => Self::None,
        }
    }
}

/// Section selection for embedded headings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeadingMode {
    /// The heading followed by its section.
    #[default]
    WithSection,
    /// The heading alone.
    HeadingOnly,
    /// The section without the heading.
    SectionOnly,
}

impl HeadingMode {
    /// Maps a wire code (0 heading and section, 1 heading only, 2 section only).
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::HeadingOnly,
            2 => Self::SectionOnly,
            _ => Self::WithSection,
        }
    }
}

/// A search over the block store.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Query text.
    pub query: String,
    /// How `query` is interpreted.
    pub method: SearchMethod,
    /// Boxes to search; empty searches all.
    pub boxes: Vec<String>,
    /// Path prefixes to search; empty searches all.
    pub paths: Vec<String>,
    /// Explicit type selection keyed by type name (`paragraph`, `heading`, ...).
    ///
    /// When present it replaces the configured type flags and missing keys are false.
    pub types: Option<HashMap<String, bool>>,
    /// Result ordering.
    pub order_by: OrderBy,
    /// Result grouping.
    pub group_by: GroupBy,
}

impl SearchRequest {
    /// Creates a keyword search for `query` with default options.
    pub fn keyword(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Result of a search.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Matching blocks, or documents with children when grouped.
    pub blocks: Vec<Block>,
    /// Number of matching blocks, ignoring the row limit.
    pub matched_block_count: usize,
    /// Number of distinct documents with matches, ignoring the row limit.
    pub matched_root_count: usize,
}

/// Result of a reference-block search.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefSearchResult {
    /// Candidate definition blocks.
    pub blocks: Vec<Block>,
    /// No document exists yet at the current document's path plus the keyword.
    pub new_doc: bool,
}

/// Summary of a find/replace run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceSummary {
    /// Documents whose trees were persisted.
    pub trees_written: usize,
    /// Documents renamed because their title changed.
    pub renamed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_fall_back_to_defaults() {
        assert_eq!(SearchMethod::from_code(3), SearchMethod::Regex);
        assert_eq!(SearchMethod::from_code(9), SearchMethod::Keyword);
        assert_eq!(OrderBy::from_code(5), OrderBy::ContentOrder);
        assert_eq!(OrderBy::from_code(42), OrderBy::Type);
        assert_eq!(GroupBy::from_code(1), GroupBy::Document);
        assert_eq!(GroupBy::from_code(2), GroupBy::None);
        assert_eq!(HeadingMode::from_code(2), HeadingMode::SectionOnly);
    }

    #[test]
    fn test_relevance_orderings() {
        assert!(OrderBy::RelevanceAsc.is_relevance());
        assert!(OrderBy::RelevanceDesc.is_relevance());
        assert!(!OrderBy::ContentOrder.is_relevance());
    }
}
