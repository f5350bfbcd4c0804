//! quarry: block search over a document store
//!
//! quarry searches the blocks of a notebook-style document store. Blocks are indexed in a
//! SQLite database with full-text tables; the documents they come from are kept as typed
//! trees. The `quarry` binary runs keyword, query-syntax, regex and raw statement searches,
//! resolves embed statements, finds reference targets, highlights documents and performs
//! find/replace across blocks.

#![warn(missing_docs)]

pub mod cli;
