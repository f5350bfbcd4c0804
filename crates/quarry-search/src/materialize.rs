//! Turning store rows into result blocks.

use std::collections::BTreeMap;

use quarry_query::{CONTENT_MAX_LEN, mark_search, max_content};
use quarry_tree::parse_ial;

use crate::{block::Block, store::BlockRecord};

/// Characters of context kept before the first highlight in content.
pub const CONTENT_BEFORE_LEN: usize = 36;

/// Characters of context kept before the first highlight in paths.
const HPATH_BEFORE_LEN: usize = 18;

/// Characters of context kept before the first highlight in names, aliases and memos.
const META_BEFORE_LEN: usize = 256;

/// Builds a result block from a row.
///
/// With an empty `keyword`, backend highlight sentinels become `<mark>` tags. Otherwise the
/// content is re-marked by keyword and scored.
pub fn materialize(record: BlockRecord, keyword: &str, case_sensitive: bool) -> Block {
    let (content, score) = mark_search(&record.content, keyword, CONTENT_BEFORE_LEN, case_sensitive);
    let content = max_content(&content, CONTENT_MAX_LEN);
    let markdown = max_content(&record.markdown, CONTENT_MAX_LEN);

    let (mut hpath, _) = mark_search(&record.hpath, keyword, HPATH_BEFORE_LEN, case_sensitive);
    if !hpath.starts_with('/') {
        hpath.insert(0, '/');
    }

    let mark_meta = |text: &str| {
        if text.is_empty() {
            String::new()
        } else {
            mark_search(text, keyword, META_BEFORE_LEN, case_sensitive).0
        }
    };
    let name = mark_meta(&record.name);
    let alias = mark_meta(&record.alias);
    let memo = mark_meta(&record.memo);

    let ial: BTreeMap<String, String> = parse_ial(&record.ial).into_iter().collect();

    Block {
        box_id: record.box_id,
        path: record.path,
        hpath,
        id: record.id,
        root_id: record.root_id,
        parent_id: record.parent_id,
        name,
        alias,
        memo,
        tag: record.tag,
        content,
        fcontent: record.fcontent,
        markdown,
        ial,
        kind: record.kind,
        sub_kind: record.sub_kind,
        sort: record.sort,
        created: record.created,
        updated: record.updated,
        children: Vec::new(),
        ref_text: String::new(),
        score,
    }
}

/// Materializes rows with sentinel conversion only.
pub fn materialize_all(records: Vec<BlockRecord>, case_sensitive: bool) -> Vec<Block> {
    records
        .into_iter()
        .map(|r| materialize(r, "", case_sensitive))
        .collect()
}
