//! Grouping results by document and ordering within groups.

use std::{cmp::Ordering, collections::HashSet};

use crate::{
    block::Block,
    cache::TreeCache,
    error::SearchError,
    materialize::materialize_all,
    request::OrderBy,
    store::BlockStore,
};

/// Compares two blocks by an ordering, or returns `None` when the order is left as is.
fn compare(order_by: OrderBy, a: &Block, b: &Block) -> Option<Ordering> {
    match order_by {
        OrderBy::CreatedAsc => Some(a.created.cmp(&b.created)),
        OrderBy::CreatedDesc => Some(b.created.cmp(&a.created)),
        OrderBy::UpdatedAsc => Some(a.updated.cmp(&b.updated)),
        OrderBy::UpdatedDesc => Some(b.updated.cmp(&a.updated)),
        OrderBy::Type | OrderBy::ContentOrder => Some(a.sort.cmp(&b.sort)),
        OrderBy::RelevanceAsc | OrderBy::RelevanceDesc => None,
    }
}

/// Stable-sorts blocks by an ordering. Relevance orderings keep the backend order.
fn sort_blocks(blocks: &mut [Block], order_by: OrderBy) {
    if order_by.is_relevance() {
        return;
    }
    blocks.sort_by(|a, b| compare(order_by, a, b).unwrap_or(Ordering::Equal));
}

/// Groups blocks under their documents.
///
/// Documents appear in first-appearance order, then are sorted by `order_by` (content order
/// and relevance leave them as they are). With [`OrderBy::ContentOrder`] each child's sort
/// key becomes its position in a depth-first walk of its tree; blocks missing from the tree
/// get 0. Documents whose root block is not in the store are dropped.
pub fn group_by_document(
    mut blocks: Vec<Block>,
    order_by: OrderBy,
    store: &BlockStore,
    cache: &mut TreeCache<'_>,
    case_sensitive: bool,
) -> Result<Vec<Block>, SearchError> {
    let mut seen = HashSet::new();
    let root_ids: Vec<String> = blocks
        .iter()
        .filter(|b| seen.insert(b.root_id.clone()))
        .map(|b| b.root_id.clone())
        .collect();

    if order_by == OrderBy::ContentOrder {
        for root_id in &root_ids {
            let order = cache
                .get(root_id)
                .map(|tree| tree.content_order())
                .unwrap_or_default();
            for block in blocks.iter_mut().filter(|b| &b.root_id == root_id) {
                block.sort = order.get(&block.id).map_or(0, |&i| i as i64);
            }
        }
    }

    let mut roots = materialize_all(store.get_blocks(&root_ids)?, case_sensitive);
    for root in &mut roots {
        let (children, rest): (Vec<Block>, Vec<Block>) =
            blocks.into_iter().partition(|b| b.root_id == root.id);
        blocks = rest;
        root.children = children;
        sort_blocks(&mut root.children, order_by);
    }

    if order_by != OrderBy::ContentOrder {
        sort_blocks(&mut roots, order_by);
    }
    Ok(roots)
}
