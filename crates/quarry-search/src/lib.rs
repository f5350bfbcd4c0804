//! Block search for quarry.
//!
//! This crate answers queries against a SQLite block store with FTS5 full-text tables and
//! edits the document trees the blocks come from. It handles:
//! - Keyword, query-syntax, regex and raw statement searches with type, box and path filters
//! - Result materialization with highlighting, truncation and scoring
//! - Grouping results by document and ordering within groups
//! - Resolving embed block statements, with heading sections and breadcrumbs
//! - Reference-block candidate search
//! - Highlight injection into document trees
//! - Find/replace across blocks, with document renames
//!
//! # Example
//!
//! ```no_run
//! use quarry_config::SearchConfig;
//! use quarry_search::{BlockStore, MemoryTreeStore, SearchEngine, SearchRequest};
//!
//! let store = BlockStore::open_in_memory().unwrap();
//! let trees = MemoryTreeStore::new();
//! let config = SearchConfig::default();
//! let engine = SearchEngine::new(&store, &trees, &config);
//!
//! let response = engine.search(&SearchRequest::keyword("error handling")).unwrap();
//! for block in &response.blocks {
//!     println!("{} {}", block.id, block.content);
//! }
//! ```

#![warn(missing_docs)]

mod block;
mod cache;
mod embed;
mod engine;
mod error;
mod executor;
mod filter;
mod group;
mod highlight;
mod materialize;
mod refs;
mod replace;
mod request;
mod store;
mod tasks;
mod trees;

pub use block::{Block, EmbedBlock, MentionPreview};
pub use cache::{TREE_CACHE_CAPACITY, TreeCache};
pub use engine::SearchEngine;
pub use error::SearchError;
pub use executor::{
    ExecContext, Executed, KeywordExecutor, PassthroughExecutor, QueryExecutor,
    QuerySyntaxExecutor, RegexExecutor, count_statement, executor_for, with_limit,
};
pub use filter::{Filter, SqlBuilder};
pub use highlight::{highlight_search, highlight_tree, mark_replace_span, mention_previews};
pub use materialize::{materialize, materialize_all};
pub use replace::Replacer;
pub use request::{
    GroupBy, HeadingMode, OrderBy, RefSearchResult, ReplaceSummary, SearchMethod,
    SearchRequest, SearchResponse,
};
pub use store::{BlockRecord, BlockStore, RefRecord};
pub use tasks::{
    ChannelTaskQueue, DiscardTasks, NoNotebookNames, NoPendingWrites, NotebookNames, Task,
    TaskQueue, WriteBarrier,
};
pub use trees::{FileTreeStore, MemoryTreeStore, TreeStore};
