//! Query text primitives for quarry search.
//!
//! This crate holds the string-level building blocks shared by the search executors and the
//! highlight machinery:
//!
//! - **Sanitizing**: invisible character stripping, block ID detection, HTML escaping
//! - **FTS phrasing**: whitespace-split phrase quoting for keyword queries
//! - **Marking**: wrapping keyword occurrences, sentinel conversion, preview splitting
//! - **Truncation**: rune-bounded cutting that never splits a highlight tag
//! - **Scoring**: Jaro-Winkler similarity and keyword scores
//!
//! # Example
//!
//! ```
//! use quarry_query::{mark_text, phrase_query};
//!
//! assert_eq!(phrase_query("error handling"), r#""error" "handling""#);
//! let (pos, marked) = mark_text("My ABC Note", "abc", 36, false);
//! assert_eq!(pos, Some(3));
//! assert_eq!(marked, "My <mark>ABC</mark> Note");
//! ```

#![warn(missing_docs)]

mod mark;
mod score;
mod text;
mod truncate;

pub use mark::{
    MARK_END, MARK_START, SEARCH_MARK_LEFT, SEARCH_MARK_RIGHT, SEARCH_MARK_TYPE, SPAN_END,
    TERM_SEP, enclose_highlighting, mark_replace_span_with_split, mark_text, sentinels_to_mark,
    span_start, split_keywords,
};
pub use score::{jaro, jaro_winkler, mark_search};
pub use text::{escape_html, is_block_id, phrase_query, regex_escape, remove_invisible};
pub use truncate::{CONTENT_MAX_LEN, max_content, truncate_runes};
