//! Implementation of `quarry search`.

use std::{collections::HashMap, process::ExitCode};

use quarry_search::{GroupBy, SearchEngine, SearchRequest, SearchResponse};
use serde::Serialize;

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{dim, print_blocks, print_json},
};

/// Builds the engine request from command arguments.
fn build_request(cmd: &SearchCommand) -> SearchRequest {
    let types = (!cmd.types.is_empty()).then(|| {
        cmd.types
            .iter()
            .map(|t| (t.clone(), true))
            .collect::<HashMap<_, _>>()
    });
    SearchRequest {
        query: cmd.query.clone(),
        method: cmd.method.into(),
        boxes: cmd.boxes.clone(),
        paths: cmd.paths.clone(),
        types,
        order_by: cmd.order.into(),
        group_by: if cmd.group {
            GroupBy::Document
        } else {
            GroupBy::None
        },
    }
}

/// JSON output for `quarry search`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSearchOutput<'a> {
    /// The query as given.
    query: &'a str,
    /// The engine's response.
    #[serde(flatten)]
    response: &'a SearchResponse,
}

/// Searches the block store and prints matching blocks.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let store = match ctx.open_store() {
        Ok(store) => store,
        Err(code) => return code,
    };
    let trees = match ctx.tree_store() {
        Ok(trees) => trees,
        Err(code) => return code,
    };

    let mut search = ctx.config.search.clone();
    if let Some(limit) = cmd.limit {
        search.limit = limit;
    }
    if cmd.case_sensitive {
        search.case_sensitive = true;
    }

    let engine = SearchEngine::new(&store, &trees, &search);
    let response = match engine.search(&build_request(cmd)) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.output.json {
        return print_json(&JsonSearchOutput {
            query: &cmd.query,
            response: &response,
        });
    }

    print_blocks(&response.blocks, cmd.group);
    if !response.blocks.is_empty() {
        println!(
            "{}",
            dim(&format!(
                "{} blocks in {} documents",
                response.matched_block_count, response.matched_root_count
            ))
        );
    }
    ExitCode::SUCCESS
}
