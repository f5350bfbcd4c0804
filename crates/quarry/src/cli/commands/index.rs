//! Implementation of `quarry index`.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use quarry_search::BlockStore;
use quarry_tree::read_tree;
use tracing::{info, warn};

use crate::cli::{
    context::CommandContext,
    output::{dim, success},
};

/// File extension of persisted trees.
const TREE_EXTENSION: &str = "sy";

/// Lists tree files directly inside `dir`, sorted by name.
fn tree_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == TREE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Indexes every tree file, returning the document and block counts.
///
/// Unreadable trees are skipped with a warning; store errors abort.
fn index_files(store: &BlockStore, files: &[PathBuf]) -> Result<(usize, usize), String> {
    let mut documents = 0;
    let mut blocks = 0;
    for path in files {
        let tree = match read_tree(path) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable tree");
                continue;
            }
        };
        blocks += store
            .index_tree(&tree)
            .map_err(|e| format!("failed to index {}: {e}", path.display()))?;
        documents += 1;
    }
    Ok((documents, blocks))
}

/// Rebuilds the block rows of every document in the tree directory.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let Some(dir) = ctx.config.store.trees.as_deref() else {
        eprintln!("error: no tree directory configured");
        return ExitCode::FAILURE;
    };
    let store = match ctx.open_store() {
        Ok(store) => store,
        Err(code) => return code,
    };

    let files = match tree_files(dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("error: failed to read tree directory {}: {e}", dir.display());
            return ExitCode::FAILURE;
        }
    };
    if files.is_empty() {
        println!("{}", dim("No documents to index."));
        return ExitCode::SUCCESS;
    }

    match index_files(&store, &files) {
        Ok((documents, blocks)) => {
            info!(documents, blocks, "index complete");
            println!(
                "{}",
                success(&format!("Indexed {blocks} blocks from {documents} documents"))
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
