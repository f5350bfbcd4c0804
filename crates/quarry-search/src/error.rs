//! Error types for the quarry-search crate.

use std::path::PathBuf;

use quarry_tree::TreeError;
use thiserror::Error;

/// Errors that can occur when searching or rewriting blocks.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Failed to open the block database.
    #[error("failed to open block store at {path}: {source}")]
    OpenStore {
        /// Path to the database file.
        path: PathBuf,
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },

    /// A block store query failed.
    #[error("block store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A document tree could not be loaded.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A rewritten tree could not be persisted; later documents were not processed.
    #[error("failed to persist tree {id}: {source}")]
    Persist {
        /// Document ID of the tree being written.
        id: String,
        /// Underlying tree error.
        source: TreeError,
    },

    /// Find/replace was called with a method that cannot substitute text.
    #[error("find and replace does not support {method} search, use keyword or regex")]
    UnsupportedReplaceMethod {
        /// Name of the rejected method.
        method: &'static str,
    },
}
