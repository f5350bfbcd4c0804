//! Filter building.
//!
//! Requests and configuration turn into SQL fragments with bound parameters. User supplied
//! values never reach the SQL text.

use std::collections::HashMap;

use quarry_config::{BlockTypes, SearchConfig};
use rusqlite::types::Value;

use crate::request::{OrderBy, SearchRequest};

/// Request type names and the block type codes they select, in filter order.
const TYPE_NAMES: [(&str, &str); 12] = [
    ("document", "d"),
    ("heading", "h"),
    ("list", "l"),
    ("listItem", "i"),
    ("codeBlock", "c"),
    ("mathBlock", "m"),
    ("table", "t"),
    ("blockquote", "b"),
    ("superBlock", "s"),
    ("paragraph", "p"),
    ("htmlBlock", "html"),
    ("embedBlock", "query_embed"),
];

/// SQL text with numbered parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlBuilder {
    /// Statement text.
    sql: String,
    /// Bound values; `?N` refers to `params[N - 1]`.
    params: Vec<Value>,
}

impl SqlBuilder {
    /// Starts a statement.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Appends raw SQL.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Binds a value and returns its placeholder.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.params.push(value.into());
        format!("?{}", self.params.len())
    }

    /// Returns the statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound values.
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Block type codes selected by configuration flags.
fn configured_types(types: &BlockTypes) -> Vec<&'static str> {
    let flags = [
        types.document,
        types.heading,
        types.list,
        types.list_item,
        types.code_block,
        types.math_block,
        types.table,
        types.blockquote,
        types.super_block,
        types.paragraph,
        types.html_block,
        types.embed_block,
    ];
    TYPE_NAMES
        .iter()
        .zip(flags)
        .filter(|(_, on)| *on)
        .map(|((_, code), _)| *code)
        .collect()
}

/// Block type codes selected by an explicit request map. Missing keys are false.
fn requested_types(types: &HashMap<String, bool>) -> Vec<&'static str> {
    TYPE_NAMES
        .iter()
        .filter(|(name, _)| types.get(*name).copied().unwrap_or(false))
        .map(|(_, code)| *code)
        .collect()
}

/// Type, box and path restrictions for a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Included block type codes.
    types: Vec<&'static str>,
    /// Boxes to match exactly; empty matches all.
    boxes: Vec<String>,
    /// Storage path prefixes; empty matches all.
    paths: Vec<String>,
}

impl Filter {
    /// Builds the filter for a request.
    ///
    /// An explicit type map replaces the configured type flags entirely.
    pub fn from_request(request: &SearchRequest, config: &SearchConfig) -> Self {
        let types = match request.types {
            Some(ref map) => requested_types(map),
            None => configured_types(&config.types),
        };
        Self {
            types,
            boxes: request.boxes.clone(),
            paths: request.paths.clone(),
        }
    }

    /// Builds a filter over the configured types only.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            types: configured_types(&config.types),
            ..Self::default()
        }
    }

    /// Returns the included type codes.
    pub fn type_codes(&self) -> &[&'static str] {
        &self.types
    }

    /// Appends ` AND type IN (...)` plus the box and path restrictions.
    ///
    /// An empty type selection yields `type IN ()`, which matches nothing.
    pub fn write(&self, sql: &mut SqlBuilder) {
        let types = self
            .types
            .iter()
            .map(|code| format!("'{code}'"))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push(&format!(" AND type IN ({types})"));

        if !self.boxes.is_empty() {
            let clauses: Vec<String> = self
                .boxes
                .iter()
                .map(|b| format!("box = {}", sql.bind(b.clone())))
                .collect();
            sql.push(&format!(" AND ({})", clauses.join(" OR ")));
        }
        if !self.paths.is_empty() {
            let clauses: Vec<String> = self
                .paths
                .iter()
                .map(|p| {
                    let placeholder = sql.bind(format!("{}%", escape_like(p)));
                    format!("path LIKE {placeholder} ESCAPE '\\'")
                })
                .collect();
            sql.push(&format!(" AND ({})", clauses.join(" OR ")));
        }
    }
}

/// Returns the columns keyword and regex searches look at.
///
/// `content` and `tag` are always searched.
pub fn searched_columns(config: &SearchConfig) -> Vec<&'static str> {
    let mut columns = vec!["content"];
    if config.name {
        columns.push("name");
    }
    if config.alias {
        columns.push("alias");
    }
    if config.memo {
        columns.push("memo");
    }
    if config.ial {
        columns.push("ial");
    }
    columns.push("tag");
    columns
}

/// Returns the full-text column filter, e.g. `{content name alias memo tag}`.
pub fn column_filter(config: &SearchConfig) -> String {
    format!("{{{}}}", searched_columns(config).join(" "))
}

/// Returns the `ORDER BY` clause for an ordering.
///
/// Relevance orderings use the full-text rank when `rank_available`, and fall back to the
/// document sort key otherwise. Content order is applied after grouping.
pub fn order_clause(order_by: OrderBy, rank_available: bool) -> &'static str {
    match order_by {
        OrderBy::CreatedAsc => "ORDER BY created ASC",
        OrderBy::CreatedDesc => "ORDER BY created DESC",
        OrderBy::UpdatedAsc => "ORDER BY updated ASC",
        OrderBy::UpdatedDesc => "ORDER BY updated DESC",
        OrderBy::RelevanceAsc if rank_available => "ORDER BY rank DESC",
        OrderBy::RelevanceDesc if rank_available => "ORDER BY rank",
        _ => "ORDER BY sort ASC",
    }
}
