//! Implementation of `quarry replace`.

use std::{collections::BTreeSet, process::ExitCode};

use quarry_search::{BlockStore, SearchEngine, SearchError, SearchMethod, TreeStore};
use tracing::warn;

use super::TaskLog;
use crate::cli::{
    args::ReplaceCommand,
    context::CommandContext,
    output::{dim, print_json, success},
};

/// Reindexes the given documents from their stored trees.
fn reindex(store: &BlockStore, trees: &dyn TreeStore, root_ids: &BTreeSet<String>) {
    for root_id in root_ids {
        let indexed = trees
            .load_tree(root_id)
            .map_err(SearchError::from)
            .and_then(|tree| store.index_tree(&tree));
        if let Err(e) = indexed {
            warn!(id = %root_id, error = %e, "failed to reindex document");
        }
    }
}

/// Replaces text in the given blocks and reindexes their documents.
pub fn run(ctx: &CommandContext, cmd: &ReplaceCommand) -> ExitCode {
    let store = match ctx.open_store() {
        Ok(store) => store,
        Err(code) => return code,
    };
    let trees = match ctx.tree_store() {
        Ok(trees) => trees,
        Err(code) => return code,
    };

    let root_ids: BTreeSet<String> = match store.get_blocks(&cmd.ids) {
        Ok(blocks) => blocks.into_iter().map(|b| b.root_id).collect(),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let method = if cmd.regex {
        SearchMethod::Regex
    } else {
        SearchMethod::Keyword
    };
    let tasks = TaskLog::new();
    let engine =
        SearchEngine::new(&store, &trees, &ctx.config.search).with_tasks(&tasks.queue);
    let result = engine.find_replace(&cmd.keyword, &cmd.replacement, &cmd.ids, method);
    tasks.flush();
    reindex(&store, &trees, &root_ids);

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("error: replace failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.output.json {
        return print_json(&summary);
    }

    if summary.trees_written == 0 {
        println!("{}", dim("Nothing replaced."));
        return ExitCode::SUCCESS;
    }
    println!(
        "{}",
        success(&format!(
            "Rewrote {} documents ({} renamed)",
            summary.trees_written, summary.renamed
        ))
    );
    ExitCode::SUCCESS
}
