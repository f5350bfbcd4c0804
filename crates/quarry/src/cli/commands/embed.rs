//! Implementation of `quarry embed`.

use std::process::ExitCode;

use quarry_search::SearchEngine;

use super::TaskLog;
use crate::cli::{
    args::EmbedCommand,
    context::CommandContext,
    output::{block_table, dim, print_json},
};

/// Resolves an embed statement and prints the embedded blocks.
pub fn run(ctx: &CommandContext, cmd: &EmbedCommand) -> ExitCode {
    let store = match ctx.open_store() {
        Ok(store) => store,
        Err(code) => return code,
    };
    let trees = match ctx.tree_store() {
        Ok(trees) => trees,
        Err(code) => return code,
    };

    let tasks = TaskLog::new();
    let engine = SearchEngine::new(&store, &trees, &ctx.config.search)
        .with_tasks(&tasks.queue)
        .with_notebooks(&ctx.config.notebooks);
    let result = engine.search_embed(
        &cmd.embed_id,
        &cmd.stmt,
        &cmd.exclude,
        cmd.heading_mode.into(),
        cmd.breadcrumb,
    );
    tasks.flush();

    let embedded = match result {
        Ok(embedded) => embedded,
        Err(e) => {
            eprintln!("error: embed query failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.output.json {
        return print_json(&embedded);
    }

    if embedded.is_empty() {
        println!("{}", dim("No blocks embedded."));
        return ExitCode::SUCCESS;
    }

    println!("{}", block_table(embedded.iter().map(|e| &e.block)));
    if cmd.breadcrumb {
        for entry in &embedded {
            let crumbs: Vec<&str> = entry.block_paths.iter().map(|p| p.name.as_str()).collect();
            println!("{} {}", entry.block.id, dim(&crumbs.join(" > ")));
        }
    }
    ExitCode::SUCCESS
}
