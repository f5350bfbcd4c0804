//! Rendering and JSON serialization for CLI output.

use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use quarry_highlight::{Highlighter, render_marks, strip_marks};
pub use quarry_highlight::{dim, header, success};
use quarry_search::Block;
use serde::Serialize;

/// Maximum characters of block content shown in a table cell.
const CELL_CONTENT_MAX: usize = 80;

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints JSON text, highlighted when stdout is a terminal.
pub fn print_highlighted_json(json: &str) {
    if io::stdout().is_terminal() {
        println!("{}", Highlighter::new().highlight_json(json));
    } else {
        println!("{json}");
    }
}

/// Prints TOML text, highlighted when stdout is a terminal.
pub fn print_highlighted_toml(toml: &str) {
    if io::stdout().is_terminal() {
        print!("{}", Highlighter::new().highlight_toml(toml));
    } else {
        print!("{toml}");
    }
}

/// Formats block content for display, styling or stripping `<mark>` tags.
pub fn display_content(content: &str) -> String {
    if io::stdout().is_terminal() {
        render_marks(content)
    } else {
        strip_marks(content)
    }
}

/// Shortens text to `CELL_CONTENT_MAX` characters.
fn clip(text: &str) -> String {
    if text.chars().count() <= CELL_CONTENT_MAX {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(CELL_CONTENT_MAX).collect();
    clipped.push_str("...");
    clipped
}

/// Builds a table of blocks with their ID, type, path and content.
pub fn block_table<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["ID", "Type", "Path", "Content"]);
    for block in blocks {
        table.add_row(vec![
            Cell::new(&block.id),
            Cell::new(&block.kind),
            Cell::new(&block.hpath),
            Cell::new(clip(&strip_marks(&block.content))),
        ]);
    }
    table
}

/// Prints search results, one table per document when grouped.
pub fn print_blocks(blocks: &[Block], grouped: bool) {
    if blocks.is_empty() {
        println!("{}", dim("No results found."));
        return;
    }

    if !grouped {
        println!("{}", block_table(blocks));
        return;
    }

    for doc in blocks {
        println!(
            "{} {}",
            header(&display_content(&doc.content)),
            dim(&doc.hpath)
        );
        println!("{}", block_table(&doc.children));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_long_content() {
        let long = "x".repeat(CELL_CONTENT_MAX + 10);
        let clipped = clip(&long);
        assert_eq!(clipped.chars().count(), CELL_CONTENT_MAX + 3);
        assert!(clipped.ends_with("..."));
        assert_eq!(clip("short"), "short");
    }

    #[test]
    fn test_block_table_strips_marks() {
        let block = Block {
            id: "20230101120000-abcdefg".into(),
            kind: "p".into(),
            hpath: "/Notes".into(),
            content: "an <mark>error</mark>".into(),
            ..Block::default()
        };
        let rendered = block_table([&block]).to_string();
        assert!(rendered.contains("20230101120000-abcdefg"));
        assert!(rendered.contains("an error"));
        assert!(!rendered.contains("<mark>"));
    }
}
