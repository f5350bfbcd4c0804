//! Implementation of `quarry highlight`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use quarry_search::{MentionPreview, SearchEngine};
use quarry_tree::tree_to_json;

use crate::cli::{
    args::HighlightCommand,
    context::CommandContext,
    output::{dim, display_content, print_highlighted_json, print_json},
};

/// Prints a document tree with the keywords wrapped in search-mark spans, or with
/// `--preview` the mention previews of its matching blocks.
///
/// The stored tree is left unchanged.
pub fn run(ctx: &CommandContext, cmd: &HighlightCommand) -> ExitCode {
    let store = match ctx.open_store() {
        Ok(store) => store,
        Err(code) => return code,
    };
    let trees = match ctx.tree_store() {
        Ok(trees) => trees,
        Err(code) => return code,
    };

    let engine = SearchEngine::new(&store, &trees, &ctx.config.search);
    if cmd.preview {
        return match engine.mention_previews(&cmd.root_id, &cmd.keywords) {
            Ok(previews) => print_previews(&previews, cmd.output.json),
            Err(e) => {
                eprintln!("error: failed to preview {}: {e}", cmd.root_id);
                ExitCode::FAILURE
            }
        };
    }

    let tree = match engine.highlight(&cmd.root_id, &cmd.keywords) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("error: failed to highlight {}: {e}", cmd.root_id);
            return ExitCode::FAILURE;
        }
    };

    match tree_to_json(&tree) {
        Ok(json) => {
            print_highlighted_json(&json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints mention previews as JSON or as a table.
fn print_previews(previews: &[MentionPreview], json: bool) -> ExitCode {
    if json {
        return print_json(&previews);
    }
    if previews.is_empty() {
        println!("{}", dim("No mentions found."));
        return ExitCode::SUCCESS;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "Preview"]);
    for preview in previews {
        table.add_row(vec![
            Cell::new(&preview.id),
            Cell::new(display_content(&preview.content)),
        ]);
    }
    println!("{table}");
    ExitCode::SUCCESS
}
