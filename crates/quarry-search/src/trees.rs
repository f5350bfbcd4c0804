//! Document tree storage.
//!
//! The engine never parses source documents itself. It loads and persists whole trees
//! through a [`TreeStore`], which can be backed by memory (tests, embedding hosts) or by
//! JSON files on disk.

use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use quarry_tree::{Tree, TreeError, read_tree, write_tree};
use tracing::debug;

/// File extension of persisted trees.
const TREE_EXTENSION: &str = "sy";

/// Loads and persists document trees.
pub trait TreeStore {
    /// Loads the tree of a document.
    fn load_tree(&self, root_id: &str) -> Result<Tree, TreeError>;

    /// Persists a tree, replacing the stored version.
    fn write_tree(&self, tree: &Tree) -> Result<(), TreeError>;

    /// Renames a document. `path` is the document's storage path within `box_id`.
    fn rename_document(&self, box_id: &str, path: &str, title: &str) -> Result<(), TreeError>;
}

/// Applies a new title to a tree, updating the last segment of its human readable path.
fn retitle(tree: &mut Tree, title: &str) {
    tree.set_title(title);
    let parent = tree
        .hpath
        .rsplit_once('/')
        .map_or("", |(parent, _)| parent)
        .to_string();
    tree.hpath = format!("{parent}/{title}");
}

/// In-memory tree store.
///
/// Records every write and rename so callers can observe persistence.
#[derive(Debug, Default)]
pub struct MemoryTreeStore {
    /// Trees keyed by document ID.
    trees: RefCell<HashMap<String, Tree>>,
    /// Document IDs in write order.
    writes: RefCell<Vec<String>>,
    /// Document IDs whose writes fail.
    failing: RefCell<Vec<String>>,
}

impl MemoryTreeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a tree without recording a write.
    pub fn insert(&self, tree: Tree) {
        self.trees.borrow_mut().insert(tree.id.clone(), tree);
    }

    /// Returns a copy of a stored tree.
    pub fn get(&self, root_id: &str) -> Option<Tree> {
        self.trees.borrow().get(root_id).cloned()
    }

    /// Returns how many times a document was written.
    pub fn write_count(&self, root_id: &str) -> usize {
        self.writes.borrow().iter().filter(|id| *id == root_id).count()
    }

    /// Returns the total number of writes.
    pub fn total_writes(&self) -> usize {
        self.writes.borrow().len()
    }

    /// Makes every future write of `root_id` fail.
    pub fn fail_writes_for(&self, root_id: &str) {
        self.failing.borrow_mut().push(root_id.to_string());
    }
}

impl TreeStore for MemoryTreeStore {
    fn load_tree(&self, root_id: &str) -> Result<Tree, TreeError> {
        self.get(root_id).ok_or_else(|| TreeError::NotFound {
            id: root_id.to_string(),
        })
    }

    fn write_tree(&self, tree: &Tree) -> Result<(), TreeError> {
        if self.failing.borrow().contains(&tree.id) {
            return Err(TreeError::WriteFile {
                path: PathBuf::from(&tree.path),
                source: io::Error::other("write rejected"),
            });
        }
        self.writes.borrow_mut().push(tree.id.clone());
        self.insert(tree.clone());
        Ok(())
    }

    fn rename_document(&self, box_id: &str, path: &str, title: &str) -> Result<(), TreeError> {
        let mut trees = self.trees.borrow_mut();
        let tree = trees
            .values_mut()
            .find(|t| t.box_id == box_id && t.path == path)
            .ok_or_else(|| TreeError::NotFound {
                id: path.to_string(),
            })?;
        retitle(tree, title);
        Ok(())
    }
}

/// Tree store keeping one JSON file per document, `<dir>/<root id>.sy`.
#[derive(Debug, Clone)]
pub struct FileTreeStore {
    /// Directory holding the tree files.
    dir: PathBuf,
}

impl FileTreeStore {
    /// Creates a store over `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file path for a document.
    pub fn tree_path(&self, root_id: &str) -> PathBuf {
        self.dir.join(format!("{root_id}.{TREE_EXTENSION}"))
    }
}

impl TreeStore for FileTreeStore {
    fn load_tree(&self, root_id: &str) -> Result<Tree, TreeError> {
        let path = self.tree_path(root_id);
        if !path.is_file() {
            return Err(TreeError::NotFound {
                id: root_id.to_string(),
            });
        }
        read_tree(&path)
    }

    fn write_tree(&self, tree: &Tree) -> Result<(), TreeError> {
        let path = self.tree_path(&tree.id);
        debug!(id = %tree.id, path = %path.display(), "writing tree");
        write_tree(tree, &path)
    }

    fn rename_document(&self, _box_id: &str, path: &str, title: &str) -> Result<(), TreeError> {
        let root_id = Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| TreeError::NotFound {
                id: path.to_string(),
            })?;
        let mut tree = self.load_tree(root_id)?;
        retitle(&mut tree, title);
        self.write_tree(&tree)
    }
}
