//! Implementation of `quarry refs`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use quarry_search::SearchEngine;

use crate::cli::{
    args::RefsCommand,
    context::CommandContext,
    output::{dim, print_json},
};

/// Lists candidate reference targets for the text typed so far.
pub fn run(ctx: &CommandContext, cmd: &RefsCommand) -> ExitCode {
    let store = match ctx.open_store() {
        Ok(store) => store,
        Err(code) => return code,
    };
    let trees = match ctx.tree_store() {
        Ok(trees) => trees,
        Err(code) => return code,
    };

    let engine = SearchEngine::new(&store, &trees, &ctx.config.search);
    let result = match engine.search_refs(&cmd.id, &cmd.root_id, &cmd.keyword) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: reference search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.output.json {
        return print_json(&result);
    }

    if result.blocks.is_empty() {
        println!("{}", dim("No reference targets found."));
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["ID", "Type", "Path", "Anchor"]);
        for block in &result.blocks {
            table.add_row(vec![
                Cell::new(&block.id),
                Cell::new(&block.kind),
                Cell::new(&block.hpath),
                Cell::new(&block.ref_text),
            ]);
        }
        println!("{table}");
    }

    if result.new_doc {
        let note = format!("No document named \"{}\" exists here yet.", cmd.keyword.trim());
        println!("{}", dim(&note));
    }
    ExitCode::SUCCESS
}
