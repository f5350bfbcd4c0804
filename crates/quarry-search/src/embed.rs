//! Embed query resolution.

use std::collections::{HashMap, HashSet};

use quarry_query::escape_html;
use quarry_tree::{NodeId, NodeKind, Tree};

use crate::{
    block::EmbedBlock,
    cache::TreeCache,
    materialize::materialize,
    request::HeadingMode,
    store::BlockRecord,
};

/// Type code of embed blocks, which never resolve inside another embed.
const QUERY_EMBED_TYPE: &str = "query_embed";

/// Drops embed blocks and excluded IDs, keeping row order.
pub fn filter_embed_rows(rows: Vec<BlockRecord>, exclude_ids: &[String]) -> Vec<BlockRecord> {
    let excluded: HashSet<&str> = exclude_ids.iter().map(String::as_str).collect();
    rows.into_iter()
        .filter(|r| r.kind != QUERY_EMBED_TYPE && !excluded.contains(r.id.as_str()))
        .collect()
}

/// Returns the display content of a heading for a heading mode.
fn heading_content(tree: &Tree, heading: NodeId, mode: HeadingMode) -> Option<String> {
    if !matches!(tree.node(heading).kind, NodeKind::Heading { .. }) {
        return None;
    }
    let mut nodes = Vec::new();
    if mode != HeadingMode::SectionOnly {
        nodes.push(heading);
    }
    if mode != HeadingMode::HeadingOnly {
        nodes.extend(tree.heading_section(heading));
    }
    let parts: Vec<String> = nodes
        .into_iter()
        .map(|n| escape_html(&tree.text_content(n)))
        .collect();
    Some(parts.join("\n"))
}

/// Builds embed blocks for rows whose trees and nodes resolve.
///
/// Each block's path is prefixed with its box's display name when one is known. Rows whose
/// tree cannot be loaded, or whose block is missing from its tree, are dropped.
pub fn build_embed_blocks(
    rows: Vec<BlockRecord>,
    cache: &mut TreeCache<'_>,
    box_names: &HashMap<String, String>,
    heading_mode: HeadingMode,
    breadcrumb: bool,
    case_sensitive: bool,
) -> Vec<EmbedBlock> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(tree) = cache.get(&row.root_id) else {
            continue;
        };
        let Some(node) = tree.find_block(&row.id) else {
            continue;
        };

        let mut block = materialize(row, "", case_sensitive);
        if let Some(name) = box_names.get(&block.box_id) {
            block.hpath = format!("{name}{}", block.hpath);
        }
        if let Some(content) = heading_content(&tree, node, heading_mode) {
            block.content = content;
        }
        let block_paths = if breadcrumb {
            tree.block_path(node)
        } else {
            Vec::new()
        };
        out.push(EmbedBlock { block, block_paths });
    }
    out
}
