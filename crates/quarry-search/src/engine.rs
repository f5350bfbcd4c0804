//! The search engine facade.

use std::{collections::HashSet, time::Duration};

use quarry_config::SearchConfig;
use quarry_query::{is_block_id, max_content, remove_invisible};
use quarry_tree::{InlineParser, SpanMarkParser, Tree, TreeError};
use tracing::{debug, info, warn};

use crate::{
    block::{Block, EmbedBlock, MentionPreview},
    cache::TreeCache,
    embed::{build_embed_blocks, filter_embed_rows},
    error::SearchError,
    executor::{ExecContext, executor_for, lookup_by_id, with_limit},
    filter::Filter,
    group::group_by_document,
    highlight::{highlight_search, mention_previews},
    materialize::{materialize, materialize_all},
    refs::{child_hpath, is_excluded, ref_search_statement},
    replace::{Replacer, replace_in_subtree},
    request::{
        GroupBy, HeadingMode, RefSearchResult, ReplaceSummary, SearchMethod, SearchRequest,
        SearchResponse,
    },
    store::BlockStore,
    tasks::{
        DiscardTasks, NoNotebookNames, NoPendingWrites, NotebookNames, Task, TaskQueue,
        WriteBarrier,
    },
    trees::TreeStore,
};

/// Delay before the UI reloads after a multi-block replace.
const RELOAD_DELAY: Duration = Duration::from_secs(1);

/// Searches, resolves embeds and rewrites blocks over a store and its trees.
///
/// Every entry point waits on the write barrier before reading.
pub struct SearchEngine<'a> {
    /// Indexed blocks.
    store: &'a BlockStore,
    /// Document trees.
    trees: &'a dyn TreeStore,
    /// Search settings.
    config: &'a SearchConfig,
    /// Pending write coordination.
    barrier: &'a dyn WriteBarrier,
    /// Background task sink.
    tasks: &'a dyn TaskQueue,
    /// Box display names.
    notebooks: &'a dyn NotebookNames,
    /// Parser for highlighted inline markup.
    parser: &'a dyn InlineParser,
}

/// Documents to rewrite, each with the block IDs inside it, in first-seen order.
type RootGroups = Vec<(String, Vec<String>)>;

impl<'a> SearchEngine<'a> {
    /// Creates an engine with no pending writes, no task consumer and no notebook names.
    pub fn new(store: &'a BlockStore, trees: &'a dyn TreeStore, config: &'a SearchConfig) -> Self {
        Self {
            store,
            trees,
            config,
            barrier: &NoPendingWrites,
            tasks: &DiscardTasks,
            notebooks: &NoNotebookNames,
            parser: &SpanMarkParser,
        }
    }

    /// Sets the write barrier.
    #[must_use]
    pub fn with_barrier(mut self, barrier: &'a dyn WriteBarrier) -> Self {
        self.barrier = barrier;
        self
    }

    /// Sets the background task queue.
    #[must_use]
    pub fn with_tasks(mut self, tasks: &'a dyn TaskQueue) -> Self {
        self.tasks = tasks;
        self
    }

    /// Sets the notebook name directory.
    #[must_use]
    pub fn with_notebooks(mut self, notebooks: &'a dyn NotebookNames) -> Self {
        self.notebooks = notebooks;
        self
    }

    /// Sets the inline parser used when injecting highlights.
    #[must_use]
    pub fn with_parser(mut self, parser: &'a dyn InlineParser) -> Self {
        self.parser = parser;
        self
    }

    /// Runs a full-text search.
    ///
    /// An empty query returns an empty response. A query that is a block ID returns that
    /// block regardless of method and filters.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        self.barrier.wait_for_writes();

        let query = request.query.trim();
        if query.is_empty() {
            return Ok(SearchResponse::default());
        }

        let filter = Filter::from_request(request, self.config);
        let ctx = ExecContext {
            store: self.store,
            config: self.config,
            filter: &filter,
            order_by: request.order_by,
        };
        let id = remove_invisible(query);
        let executed = if is_block_id(&id) {
            lookup_by_id(self.store, &id)?
        } else {
            executor_for(request.method).execute(ctx, query)?
        };
        debug!(
            method = request.method.name(),
            types = ?filter.type_codes(),
            rows = executed.rows.len(),
            matched = executed.matched_block_count,
            "search executed"
        );

        let cs = self.config.case_sensitive;
        let mut blocks = materialize_all(executed.rows, cs);
        if request.group_by == GroupBy::Document {
            let mut cache = TreeCache::new(self.trees);
            blocks = group_by_document(blocks, request.order_by, self.store, &mut cache, cs)?;
        }

        Ok(SearchResponse {
            blocks,
            matched_block_count: executed.matched_block_count,
            matched_root_count: executed.matched_root_count,
        })
    }

    /// Resolves the statement of an embed block into the blocks it shows.
    ///
    /// Embed blocks and `exclude_ids` are dropped from the results. Headings show their
    /// section according to `heading_mode`. With `breadcrumb` each block carries its path
    /// from the document root.
    pub fn search_embed(
        &self,
        embed_block_id: &str,
        stmt: &str,
        exclude_ids: &[String],
        heading_mode: HeadingMode,
        breadcrumb: bool,
    ) -> Result<Vec<EmbedBlock>, SearchError> {
        self.barrier.wait_for_writes();

        let stmt = with_limit(&remove_invisible(stmt), self.config.limit);
        let rows = filter_embed_rows(self.store.query_blocks(&stmt, &[])?, exclude_ids);
        self.tasks.enqueue(Task::IndexEmbedBlock {
            embed_block_id: embed_block_id.to_string(),
            block_ids: rows.iter().map(|r| r.id.clone()).collect(),
        });

        let mut seen = HashSet::new();
        let boxes: Vec<String> = rows
            .iter()
            .filter(|r| seen.insert(r.box_id.as_str()))
            .map(|r| r.box_id.clone())
            .collect();
        let names = self.notebooks.box_names(&boxes);

        let mut cache = TreeCache::new(self.trees);
        Ok(build_embed_blocks(
            rows,
            &mut cache,
            &names,
            heading_mode,
            breadcrumb,
            self.config.case_sensitive,
        ))
    }

    /// Finds candidate definition blocks for a new reference from block `id` in document
    /// `root_id`.
    ///
    /// An empty keyword lists recently referenced definitions. Otherwise candidates are
    /// ranked by name, alias, memo and content matches.
    pub fn search_refs(
        &self,
        id: &str,
        root_id: &str,
        keyword: &str,
    ) -> Result<RefSearchResult, SearchError> {
        self.barrier.wait_for_writes();

        let keyword = remove_invisible(keyword);
        let cs = self.config.case_sensitive;
        if keyword.is_empty() {
            return Ok(RefSearchResult {
                blocks: self.recent_ref_blocks()?,
                new_doc: false,
            });
        }

        let rows = if is_block_id(&keyword) {
            lookup_by_id(self.store, &keyword)?.rows
        } else {
            let sql = ref_search_statement(self.config, &keyword);
            self.store.query_blocks(sql.sql(), sql.params())?
        };

        let mut cache = TreeCache::new(self.trees);
        let mut blocks = Vec::new();
        for mut block in materialize_all(rows, cs) {
            if is_excluded(&block, id, root_id, &mut cache) {
                continue;
            }
            block.ref_text = self.ref_text(&block.id)?;
            blocks.push(block);
        }

        let new_doc = match self.store.get_block(id)? {
            Some(current) => !self
                .store
                .doc_exists_at(&current.box_id, &child_hpath(&current.hpath, &keyword))?,
            None => false,
        };
        Ok(RefSearchResult { blocks, new_doc })
    }

    /// Returns recently referenced definition blocks with their anchor text.
    fn recent_ref_blocks(&self) -> Result<Vec<Block>, SearchError> {
        let mut blocks = Vec::new();
        for def_id in self.store.recent_ref_defs()? {
            let Some(record) = self.store.get_block(&def_id)? else {
                continue;
            };
            let mut block = materialize(record, "", self.config.case_sensitive);
            block.ref_text = self.ref_text(&def_id)?;
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// Returns the truncated anchor text of a block.
    fn ref_text(&self, id: &str) -> Result<String, SearchError> {
        Ok(max_content(
            &self.store.ref_text(id)?,
            self.config.ref_text_max_len,
        ))
    }

    /// Replaces `keyword` with `replacement` in the given blocks and their descendants.
    ///
    /// Every affected document is written once. Documents whose title changed are renamed
    /// after all writes; rename failures are logged. Only keyword and regex methods are
    /// supported.
    pub fn find_replace(
        &self,
        keyword: &str,
        replacement: &str,
        ids: &[String],
        method: SearchMethod,
    ) -> Result<ReplaceSummary, SearchError> {
        let replacer = Replacer::new(keyword, replacement, method)?;
        self.barrier.wait_for_writes();
        if keyword == replacement {
            return Ok(ReplaceSummary::default());
        }

        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut summary = ReplaceSummary::default();
        let mut renames = Vec::new();
        for (root_id, block_ids) in self.group_by_root(&ids)? {
            let mut tree = self.trees.load_tree(&root_id)?;
            for id in &block_ids {
                let Some(node) = tree.find_block(id) else {
                    warn!(id, root_id, "block missing from its tree, skipping");
                    continue;
                };
                if let Some(title) = replace_in_subtree(&mut tree, node, &replacer) {
                    renames.push((tree.box_id.clone(), tree.path.clone(), title));
                }
            }
            self.trees
                .write_tree(&tree)
                .map_err(|source| SearchError::Persist {
                    id: root_id.clone(),
                    source,
                })?;
            summary.trees_written += 1;
        }

        for (box_id, path, title) in renames {
            match self.trees.rename_document(&box_id, &path, &title) {
                Ok(()) => summary.renamed += 1,
                Err(e) => warn!(box_id, path, error = %e, "failed to rename document"),
            }
        }

        self.barrier.wait_for_writes();
        if ids.len() > 1 {
            self.tasks.enqueue(Task::ReloadUi {
                delay: RELOAD_DELAY,
            });
        }
        info!(
            trees = summary.trees_written,
            renamed = summary.renamed,
            "find and replace finished"
        );
        Ok(summary)
    }

    /// Groups block IDs by their document, in first-seen document order.
    fn group_by_root(&self, ids: &[String]) -> Result<RootGroups, SearchError> {
        let mut groups: RootGroups = Vec::new();
        for id in ids {
            let Some(record) = self.store.get_block(id)? else {
                return Err(TreeError::NotFound { id: id.clone() }.into());
            };
            match groups.iter_mut().find(|(root, _)| *root == record.root_id) {
                Some((_, members)) => members.push(id.clone()),
                None => groups.push((record.root_id, vec![id.clone()])),
            }
        }
        Ok(groups)
    }

    /// Loads a document tree and highlights `keywords` in it.
    pub fn highlight(&self, root_id: &str, keywords: &[String]) -> Result<Tree, SearchError> {
        self.barrier.wait_for_writes();
        let mut tree = self.trees.load_tree(root_id)?;
        let rewritten = highlight_search(
            &mut tree,
            keywords,
            self.parser,
            self.config.case_sensitive,
        );
        debug!(root_id, rewritten, "highlighted tree");
        Ok(tree)
    }

    /// Loads a document tree and returns mention previews of its leaf blocks.
    pub fn mention_previews(
        &self,
        root_id: &str,
        keywords: &[String],
    ) -> Result<Vec<MentionPreview>, SearchError> {
        self.barrier.wait_for_writes();
        let tree = self.trees.load_tree(root_id)?;
        let previews = mention_previews(&tree, keywords, self.config.case_sensitive);
        debug!(root_id, previews = previews.len(), "built mention previews");
        Ok(previews)
    }
}
