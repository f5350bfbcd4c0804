//! Query executors.
//!
//! Each search method has an executor that turns query text plus filters into rows and
//! match counts. Counting failures are logged and reported as zero; row query failures are
//! returned.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use quarry_config::SearchConfig;
use quarry_query::{SEARCH_MARK_LEFT, SEARCH_MARK_RIGHT, phrase_query, regex_escape, remove_invisible};
use regex::Regex;
use rusqlite::types::Value;
use tracing::{debug, warn};

use crate::{
    error::SearchError,
    filter::{Filter, SqlBuilder, column_filter, order_clause, searched_columns},
    request::{OrderBy, SearchMethod},
    store::{BlockRecord, BlockStore, FTS_TABLE, FTS_TABLE_CASE_INSENSITIVE},
};

/// Rows and counts produced by an executor.
#[derive(Debug, Clone, Default)]
pub struct Executed {
    /// Matching rows, at most the configured limit.
    pub rows: Vec<BlockRecord>,
    /// Number of matching blocks, ignoring the limit.
    pub matched_block_count: usize,
    /// Number of distinct documents with matches, ignoring the limit.
    pub matched_root_count: usize,
}

/// Everything an executor reads.
#[derive(Clone, Copy)]
pub struct ExecContext<'a> {
    /// Block store.
    pub store: &'a BlockStore,
    /// Search settings.
    pub config: &'a SearchConfig,
    /// Type, box and path restrictions.
    pub filter: &'a Filter,
    /// Result ordering.
    pub order_by: OrderBy,
}

/// Runs one search method.
pub trait QueryExecutor {
    /// Executes `query`, already trimmed.
    fn execute(&self, ctx: ExecContext<'_>, query: &str) -> Result<Executed, SearchError>;
}

/// Returns the full-text table for the configured case sensitivity.
pub fn fts_table(config: &SearchConfig) -> &'static str {
    if config.case_sensitive {
        FTS_TABLE
    } else {
        FTS_TABLE_CASE_INSENSITIVE
    }
}

/// Runs a count statement, logging failures as zero counts.
fn counts_or_zero(store: &BlockStore, sql: &str, params: &[Value]) -> (usize, usize) {
    match store.query_counts(sql, params) {
        Ok(counts) => counts,
        Err(e) => {
            warn!(error = %e, "count query failed");
            (0, 0)
        }
    }
}

/// Looks a block up by exact ID.
pub fn lookup_by_id(store: &BlockStore, id: &str) -> Result<Executed, SearchError> {
    let rows: Vec<BlockRecord> = store.get_block(id)?.into_iter().collect();
    let roots: HashSet<&str> = rows.iter().map(|r| r.root_id.as_str()).collect();
    Ok(Executed {
        matched_block_count: rows.len(),
        matched_root_count: roots.len(),
        rows,
    })
}

/// Runs a full-text match expression with highlight projections.
fn fts_search(ctx: ExecContext<'_>, match_expr: String) -> Result<Executed, SearchError> {
    let table = fts_table(ctx.config);
    let mut body = SqlBuilder::new(format!("FROM {table} WHERE {table} MATCH "));
    let placeholder = body.bind(match_expr);
    body.push(&placeholder);
    ctx.filter.write(&mut body);

    let highlight = |column: usize| {
        format!("highlight({table}, {column}, '{SEARCH_MARK_LEFT}', '{SEARCH_MARK_RIGHT}')")
    };
    let projections = format!(
        "id, parent_id, root_id, hash, box, path, {} AS hpath, {} AS name, {} AS alias, \
         {} AS memo, tag, {} AS content, fcontent, markdown, length, type, subtype, ial, sort, \
         created, updated",
        highlight(6),
        highlight(7),
        highlight(8),
        highlight(9),
        highlight(11),
    );
    let rows_sql = format!(
        "SELECT {projections} {} {} LIMIT {}",
        body.sql(),
        order_clause(ctx.order_by, true),
        ctx.config.limit
    );
    let rows = ctx.store.query_blocks(&rows_sql, body.params())?;

    let count_sql = format!("SELECT COUNT(id), COUNT(DISTINCT root_id) {}", body.sql());
    let (matched_block_count, matched_root_count) =
        counts_or_zero(ctx.store, &count_sql, body.params());
    Ok(Executed {
        rows,
        matched_block_count,
        matched_root_count,
    })
}

/// Whitespace separated keywords, each phrase-quoted.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExecutor;

impl QueryExecutor for KeywordExecutor {
    fn execute(&self, ctx: ExecContext<'_>, query: &str) -> Result<Executed, SearchError> {
        let query = phrase_query(&remove_invisible(query));
        let expr = format!("{}:({query})", column_filter(ctx.config));
        fts_search(ctx, expr)
    }
}

/// Full-text query syntax passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuerySyntaxExecutor;

impl QueryExecutor for QuerySyntaxExecutor {
    fn execute(&self, ctx: ExecContext<'_>, query: &str) -> Result<Executed, SearchError> {
        let query = remove_invisible(query);
        let expr = format!("{}:({query})", column_filter(ctx.config));
        fts_search(ctx, expr)
    }
}

/// Escaped pattern matched with `REGEXP` over the searched columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExecutor;

impl QueryExecutor for RegexExecutor {
    fn execute(&self, ctx: ExecContext<'_>, query: &str) -> Result<Executed, SearchError> {
        let pattern = regex_escape(&remove_invisible(query));
        let mut body = SqlBuilder::new("FROM blocks WHERE ");
        let placeholder = body.bind(pattern);
        let fields = searched_columns(ctx.config)
            .iter()
            .map(|column| format!("{column} REGEXP {placeholder}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        body.push(&format!("({fields})"));
        ctx.filter.write(&mut body);

        let rows_sql = format!(
            "SELECT * {} {} LIMIT {}",
            body.sql(),
            order_clause(ctx.order_by, false),
            ctx.config.limit
        );
        let rows = ctx.store.query_blocks(&rows_sql, body.params())?;

        let count_sql = format!("SELECT COUNT(id), COUNT(DISTINCT root_id) {}", body.sql());
        let (matched_block_count, matched_root_count) =
            counts_or_zero(ctx.store, &count_sql, body.params());
        Ok(Executed {
            rows,
            matched_block_count,
            matched_root_count,
        })
    }
}

/// A raw statement executed as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughExecutor;

/// Projection rewritten to count matches.
const SELECT_ALL: &str = "select * ";

/// Trailing `LIMIT n`, `LIMIT n OFFSET m` or `LIMIT m, n` clause.
static TRAILING_LIMIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\blimit\s+\d+(\s*(,|\boffset\b)\s*\d+)?$")
        .expect("limit pattern should compile")
});

/// Appends `LIMIT limit` unless the statement already ends with a limit clause.
pub fn with_limit(stmt: &str, limit: usize) -> String {
    let stmt = stmt.trim().trim_end_matches(';').trim_end();
    if TRAILING_LIMIT.is_match(stmt) {
        stmt.to_string()
    } else {
        format!("{stmt} LIMIT {limit}")
    }
}

/// Rewrites every `select * ` projection (any case) into a block and document count.
///
/// Returns `None` when the statement has no such projection.
pub fn count_statement(stmt: &str) -> Option<String> {
    let lower = stmt.to_ascii_lowercase();
    if !lower.contains(SELECT_ALL) {
        return None;
    }
    let mut out = String::with_capacity(stmt.len() + 48);
    let mut last = 0;
    for (start, _) in lower.match_indices(SELECT_ALL) {
        out.push_str(&stmt[last..start]);
        out.push_str("SELECT COUNT(id) AS matches, COUNT(DISTINCT root_id) AS docs ");
        last = start + SELECT_ALL.len();
    }
    out.push_str(&stmt[last..]);
    Some(out)
}

impl QueryExecutor for PassthroughExecutor {
    fn execute(&self, ctx: ExecContext<'_>, query: &str) -> Result<Executed, SearchError> {
        let stmt = with_limit(&remove_invisible(query), ctx.config.limit);
        let rows = ctx.store.query_blocks(&stmt, &[])?;
        if rows.is_empty() {
            return Ok(Executed::default());
        }
        let (matched_block_count, matched_root_count) = match count_statement(&stmt) {
            Some(count_sql) => counts_or_zero(ctx.store, &count_sql, &[]),
            None => {
                debug!("statement has no select * projection, skipping counts");
                (0, 0)
            }
        };
        Ok(Executed {
            rows,
            matched_block_count,
            matched_root_count,
        })
    }
}

/// Returns the executor for a search method.
pub fn executor_for(method: SearchMethod) -> &'static dyn QueryExecutor {
    match method {
        SearchMethod::Keyword => &KeywordExecutor,
        SearchMethod::QuerySyntax => &QuerySyntaxExecutor,
        SearchMethod::Passthrough => &PassthroughExecutor,
        SearchMethod::Regex => &RegexExecutor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inserts a paragraph block.
    fn insert(store: &BlockStore, id: &str, root: &str, content: &str) {
        store
            .insert_block(&BlockRecord {
                id: id.to_string(),
                root_id: root.to_string(),
                box_id: "box1".to_string(),
                path: format!("/{root}.sy"),
                kind: "p".to_string(),
                content: content.to_string(),
                sort: 10,
                ..BlockRecord::default()
            })
            .unwrap();
    }

    /// Store with three paragraphs over two documents.
    fn store() -> BlockStore {
        let store = BlockStore::open_in_memory().unwrap();
        insert(&store, "20230101120000-aaaaaaa", "20230101120000-root001", "My ABC Note");
        insert(&store, "20230101120000-bbbbbbb", "20230101120000-root001", "abc again");
        insert(&store, "20230101120000-ccccccc", "20230101120000-root002", "unrelated text");
        store
    }

    /// Runs an executor with default settings.
    fn run(
        executor: &dyn QueryExecutor,
        store: &BlockStore,
        config: &SearchConfig,
        query: &str,
    ) -> Executed {
        let filter = Filter::from_config(config);
        let ctx = ExecContext {
            store,
            config,
            filter: &filter,
            order_by: OrderBy::Type,
        };
        executor.execute(ctx, query).unwrap()
    }

    #[test]
    fn test_keyword_case_insensitive_highlight() {
        let store = store();
        let out = run(&KeywordExecutor, &store, &SearchConfig::default(), "abc");
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.matched_block_count, 2);
        assert_eq!(out.matched_root_count, 1);
        let first = out
            .rows
            .iter()
            .find(|r| r.id == "20230101120000-aaaaaaa")
            .unwrap();
        assert_eq!(
            first.content,
            format!("My {SEARCH_MARK_LEFT}ABC{SEARCH_MARK_RIGHT} Note")
        );
    }

    #[test]
    fn test_keyword_case_sensitive() {
        let store = store();
        let config = SearchConfig {
            case_sensitive: true,
            ..SearchConfig::default()
        };
        let out = run(&KeywordExecutor, &store, &config, "abc");
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].id, "20230101120000-bbbbbbb");
    }

    #[test]
    fn test_keyword_no_match() {
        let store = store();
        let out = run(&KeywordExecutor, &store, &SearchConfig::default(), "zzzzz");
        assert!(out.rows.is_empty());
        assert_eq!((out.matched_block_count, out.matched_root_count), (0, 0));
    }

    #[test]
    fn test_query_syntax_or() {
        let store = store();
        let out = run(
            &QuerySyntaxExecutor,
            &store,
            &SearchConfig::default(),
            "note OR unrelated",
        );
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.matched_root_count, 2);
    }

    #[test]
    fn test_regex_is_literal() {
        let store = store();
        insert(&store, "20230101120000-ddddddd", "20230101120000-root002", "a.c here");
        let out = run(&RegexExecutor, &store, &SearchConfig::default(), "a.c");
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].id, "20230101120000-ddddddd");
        assert_eq!(out.matched_block_count, 1);
    }

    #[test]
    fn test_passthrough_counts() {
        let store = store();
        let out = run(
            &PassthroughExecutor,
            &store,
            &SearchConfig::default(),
            "SELECT * FROM blocks WHERE content LIKE '%abc%'",
        );
        assert_eq!(out.rows.len(), 2);
        assert_eq!((out.matched_block_count, out.matched_root_count), (2, 1));
    }

    #[test]
    fn test_passthrough_without_select_all_has_zero_counts() {
        let store = store();
        let out = run(
            &PassthroughExecutor,
            &store,
            &SearchConfig::default(),
            "SELECT id, content FROM blocks",
        );
        assert_eq!(out.rows.len(), 3);
        assert_eq!((out.matched_block_count, out.matched_root_count), (0, 0));
    }

    #[test]
    fn test_passthrough_respects_limit() {
        let store = store();
        let config = SearchConfig {
            limit: 1,
            ..SearchConfig::default()
        };
        let out = run(&PassthroughExecutor, &store, &config, "SELECT * FROM blocks;");
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.matched_block_count, 3);
    }

    #[test]
    fn test_with_limit() {
        assert_eq!(with_limit("SELECT * FROM blocks;", 5), "SELECT * FROM blocks LIMIT 5");
        assert_eq!(
            with_limit("SELECT * FROM blocks LIMIT 2", 5),
            "SELECT * FROM blocks LIMIT 2"
        );
        assert_eq!(
            with_limit("select * from blocks limit 10 offset 20 ;", 5),
            "select * from blocks limit 10 offset 20"
        );
    }

    #[test]
    fn test_with_limit_ignores_limit_in_literals() {
        assert_eq!(
            with_limit("SELECT * FROM blocks WHERE content LIKE '%limit%'", 5),
            "SELECT * FROM blocks WHERE content LIKE '%limit%' LIMIT 5"
        );
        assert_eq!(
            with_limit("SELECT * FROM blocks WHERE content = 'LIMIT 3'", 5),
            "SELECT * FROM blocks WHERE content = 'LIMIT 3' LIMIT 5"
        );
    }

    #[test]
    fn test_count_statement_preserves_literals() {
        assert_eq!(
            count_statement("Select * FROM blocks WHERE content = 'ABC'").as_deref(),
            Some(
                "SELECT COUNT(id) AS matches, COUNT(DISTINCT root_id) AS docs FROM blocks WHERE \
                 content = 'ABC'"
            )
        );
        assert!(count_statement("SELECT id FROM blocks").is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        let store = store();
        let out = lookup_by_id(&store, "20230101120000-bbbbbbb").unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!((out.matched_block_count, out.matched_root_count), (1, 1));
        let none = lookup_by_id(&store, "20230101120000-zzzzzzz").unwrap();
        assert!(none.rows.is_empty());
    }

    #[test]
    fn test_executor_for() {
        let store = store();
        let out = run(
            executor_for(SearchMethod::Keyword),
            &store,
            &SearchConfig::default(),
            "unrelated",
        );
        assert_eq!(out.rows.len(), 1);
    }
}
