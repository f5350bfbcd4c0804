//! Reference-block search.
//!
//! Candidates for a new block reference are ranked by how closely the keyword matches
//! their name, alias, memo and content, with documents and headings first.

use quarry_config::SearchConfig;
use quarry_query::{SEARCH_MARK_LEFT, SEARCH_MARK_RIGHT, phrase_query};

use crate::{
    block::Block,
    cache::TreeCache,
    executor::fts_table,
    filter::{Filter, SqlBuilder, column_filter},
};

/// Builds the ranked full-text statement for a reference keyword.
pub fn ref_search_statement(config: &SearchConfig, keyword: &str) -> SqlBuilder {
    let table = fts_table(config);
    let snippet = |column: usize| {
        format!("snippet({table}, {column}, '{SEARCH_MARK_LEFT}', '{SEARCH_MARK_RIGHT}', '...', 64)")
    };
    let mut sql = SqlBuilder::new(format!(
        "SELECT id, parent_id, root_id, hash, box, path, {} AS hpath, {} AS name, {} AS alias, \
         {} AS memo, tag, {} AS content, fcontent, markdown, length, type, subtype, ial, sort, \
         created, updated FROM {table} WHERE {table} MATCH ",
        snippet(6),
        snippet(7),
        snippet(8),
        snippet(9),
        snippet(11),
    ));
    let expr = sql.bind(format!(
        "{}:({})",
        column_filter(config),
        phrase_query(keyword)
    ));
    sql.push(&expr);
    Filter::from_config(config).write(&mut sql);

    let k = sql.bind(keyword.to_string());
    let t = table;
    sql.push(&format!(
        " ORDER BY CASE \
         WHEN {t}.name = {k} THEN 10 \
         WHEN {t}.alias = {k} THEN 20 \
         WHEN {t}.memo = {k} THEN 30 \
         WHEN {t}.content = {k} AND type = 'd' THEN 40 \
         WHEN {t}.content LIKE '%' || {k} || '%' AND type = 'd' THEN 41 \
         WHEN {t}.name LIKE '%' || {k} || '%' THEN 50 \
         WHEN {t}.alias LIKE '%' || {k} || '%' THEN 60 \
         WHEN {t}.content = {k} AND type = 'h' THEN 70 \
         WHEN {t}.content LIKE '%' || {k} || '%' AND type = 'h' THEN 71 \
         WHEN {t}.fcontent = {k} AND type = 'i' THEN 80 \
         WHEN {t}.fcontent LIKE '%' || {k} || '%' AND type = 'i' THEN 81 \
         WHEN {t}.memo LIKE '%' || {k} || '%' THEN 90 \
         WHEN {t}.content LIKE '%' || {k} || '%' AND type != 'i' AND type != 'l' THEN 100 \
         ELSE 65535 END ASC, sort ASC, length ASC LIMIT {}",
        config.limit
    ));
    sql
}

/// Checks whether a candidate must not be offered as a reference target from `id`.
///
/// The current block, its document, and containers whose first leaf block is the current
/// block are excluded.
pub fn is_excluded(block: &Block, id: &str, root_id: &str, cache: &mut TreeCache<'_>) -> bool {
    if block.id == id || block.id == root_id {
        return true;
    }
    if !block.is_container() {
        return false;
    }
    let Some(tree) = cache.get(&block.root_id) else {
        return false;
    };
    tree.find_block(&block.id)
        .and_then(|node| tree.first_leaf_block(node))
        .is_some_and(|leaf| tree.node(leaf).id.as_deref() == Some(id))
}

/// Joins a document path and a child title.
pub fn child_hpath(hpath: &str, title: &str) -> String {
    format!(
        "{}/{}",
        hpath.trim_end_matches('/'),
        title.trim_start_matches('/')
    )
}
