//! Error types for document trees.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when loading or persisting trees.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Failed to read a tree file.
    #[error("failed to read tree file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write a tree file.
    #[error("failed to write tree file {path}: {source}")]
    WriteFile {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Tree JSON could not be encoded or decoded.
    #[error("invalid tree json: {0}")]
    Json(#[from] serde_json::Error),

    /// No tree exists for a document ID.
    #[error("tree not found: {id}")]
    NotFound {
        /// The requested document ID.
        id: String,
    },

    /// The stored root node is not a document.
    #[error("tree {id} has no document root")]
    MissingRoot {
        /// The offending document ID.
        id: String,
    },
}
