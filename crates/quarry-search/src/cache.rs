//! Call-scoped tree cache.

use std::{collections::HashMap, rc::Rc};

use quarry_tree::Tree;
use tracing::{debug, warn};

use crate::trees::TreeStore;

/// Trees kept per call before the cache stops growing.
pub const TREE_CACHE_CAPACITY: usize = 128;

/// Lazily loads trees by document ID, keeping the first [`TREE_CACHE_CAPACITY`] of them.
///
/// Once full, misses are skipped without loading and return `None`; nothing is evicted.
/// Load failures are logged and neither cached nor counted.
pub struct TreeCache<'a> {
    /// Source of trees.
    trees: &'a dyn TreeStore,
    /// Cached trees by document ID.
    cached: HashMap<String, Rc<Tree>>,
    /// Most trees kept.
    capacity: usize,
}

impl<'a> TreeCache<'a> {
    /// Creates an empty cache over `trees`.
    pub fn new(trees: &'a dyn TreeStore) -> Self {
        Self::with_capacity(trees, TREE_CACHE_CAPACITY)
    }

    /// Creates an empty cache keeping at most `capacity` trees.
    pub fn with_capacity(trees: &'a dyn TreeStore, capacity: usize) -> Self {
        Self {
            trees,
            cached: HashMap::new(),
            capacity,
        }
    }

    /// Returns the tree of a document, loading it on a miss while the cache has room.
    pub fn get(&mut self, root_id: &str) -> Option<Rc<Tree>> {
        if let Some(tree) = self.cached.get(root_id) {
            return Some(Rc::clone(tree));
        }
        if self.capacity <= self.cached.len() {
            debug!(root_id, capacity = self.capacity, "tree cache full, skipping");
            return None;
        }
        let tree = match self.trees.load_tree(root_id) {
            Ok(tree) => Rc::new(tree),
            Err(e) => {
                warn!(root_id, error = %e, "failed to load tree");
                return None;
            }
        };
        self.cached.insert(root_id.to_string(), Rc::clone(&tree));
        Some(tree)
    }

    /// Returns the number of cached trees.
    pub fn len(&self) -> usize {
        self.cached.len()
    }

    /// Checks whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cached.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use quarry_tree::TreeError;

    use super::*;

    /// Tree store that counts loads and fails for IDs starting with `bad`.
    #[derive(Default)]
    struct CountingStore {
        /// Number of load calls.
        loads: Cell<usize>,
    }

    impl TreeStore for CountingStore {
        fn load_tree(&self, root_id: &str) -> Result<Tree, TreeError> {
            self.loads.set(self.loads.get() + 1);
            if root_id.starts_with("bad") {
                return Err(TreeError::NotFound {
                    id: root_id.to_string(),
                });
            }
            Ok(Tree::new(root_id, "box", "/p.sy", "/P"))
        }

        fn write_tree(&self, _tree: &Tree) -> Result<(), TreeError> {
            Ok(())
        }

        fn rename_document(&self, _: &str, _: &str, _: &str) -> Result<(), TreeError> {
            Ok(())
        }
    }

    #[test]
    fn test_hits_do_not_reload() {
        let store = CountingStore::default();
        let mut cache = TreeCache::new(&store);
        assert!(cache.get("a").is_some());
        assert!(cache.get("a").is_some());
        assert_eq!(store.loads.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_entries_win_past_capacity() {
        let store = CountingStore::default();
        let mut cache = TreeCache::with_capacity(&store, 2);
        cache.get("a");
        cache.get("b");
        assert!(cache.get("c").is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(store.loads.get(), 2);

        // Earlier entries still served from the cache.
        assert!(cache.get("a").is_some());
        assert_eq!(store.loads.get(), 2);
    }

    #[test]
    fn test_failures_not_cached() {
        let store = CountingStore::default();
        let mut cache = TreeCache::with_capacity(&store, 1);
        assert!(cache.get("bad-1").is_none());
        assert!(cache.is_empty());
        assert!(cache.get("good").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_default_capacity() {
        let store = CountingStore::default();
        let mut cache = TreeCache::new(&store);
        for i in 0..200 {
            cache.get(&format!("doc-{i}"));
        }
        assert_eq!(cache.len(), TREE_CACHE_CAPACITY);
    }
}
