//! Typed document trees for quarry.
//!
//! A document is a [`Tree`] of [`NodeKind`] nodes stored in an arena. This crate provides:
//! - Structural editing with deferred mutation (walk first, then insert or unlink)
//! - Inline attribute list (IAL) parsing and serialization
//! - Inline re-parsing of highlighted span markup
//! - JSON persistence of whole trees

#![warn(missing_docs)]

mod error;
mod ial;
mod inline;
mod node;
mod persist;
mod tree;

pub use error::TreeError;
pub use ial::{escape_attr, ial_to_string, parse_ial, unescape_attr};
pub use inline::{InlineParser, SpanMarkParser};
pub use node::{Node, NodeId, NodeKind, TextMark};
pub use persist::{read_tree, tree_from_json, tree_to_json, write_tree};
pub use tree::{PathEntry, Tree, WalkStatus};
