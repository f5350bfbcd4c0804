//! JSON persistence for document trees.
//!
//! The arena is flattened into a nested record form on write and rebuilt on read. Detached
//! nodes are not persisted.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    TreeError,
    node::{NodeId, NodeKind},
    tree::Tree,
};

/// Serialized document.
#[derive(Debug, Serialize, Deserialize)]
struct TreeRecord {
    /// Document ID.
    id: String,
    /// Box ID.
    #[serde(rename = "box")]
    box_id: String,
    /// Storage path.
    path: String,
    /// Human readable path.
    hpath: String,
    /// Document node.
    root: NodeRecord,
}

/// Serialized node with its children.
#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    /// Node kind and payload.
    kind: NodeKind,
    /// Block ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    /// Attribute pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ial: Vec<(String, String)>,
    /// Children in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Self>,
}

/// Encodes a tree as JSON.
pub fn tree_to_json(tree: &Tree) -> Result<String, TreeError> {
    let record = TreeRecord {
        id: tree.id.clone(),
        box_id: tree.box_id.clone(),
        path: tree.path.clone(),
        hpath: tree.hpath.clone(),
        root: node_record(tree, tree.root()),
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

/// Decodes a tree from JSON.
pub fn tree_from_json(json: &str) -> Result<Tree, TreeError> {
    let record: TreeRecord = serde_json::from_str(json)?;
    if record.root.kind != NodeKind::Document {
        return Err(TreeError::MissingRoot { id: record.id });
    }

    let mut tree = Tree::new(record.id, record.box_id, record.path, record.hpath);
    let root = tree.root();
    tree.node_mut(root).ial = record.root.ial;
    for child in record.root.children {
        attach(&mut tree, root, child);
    }
    Ok(tree)
}

/// Reads a tree from a JSON file.
pub fn read_tree(path: &Path) -> Result<Tree, TreeError> {
    let json = fs::read_to_string(path).map_err(|source| TreeError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    tree_from_json(&json)
}

/// Writes a tree to a JSON file, creating parent directories as needed.
pub fn write_tree(tree: &Tree, path: &Path) -> Result<(), TreeError> {
    let json = tree_to_json(tree)?;
    let write_err = |source| TreeError::WriteFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, json).map_err(write_err)
}

/// Flattens a node and its reachable subtree.
fn node_record(tree: &Tree, id: NodeId) -> NodeRecord {
    let node = tree.node(id);
    NodeRecord {
        kind: node.kind.clone(),
        id: node.id.clone(),
        ial: node.ial.clone(),
        children: tree
            .children(id)
            .into_iter()
            .map(|c| node_record(tree, c))
            .collect(),
    }
}

/// Rebuilds a record under `parent`.
fn attach(tree: &mut Tree, parent: NodeId, record: NodeRecord) {
    let id = tree.new_node(record.kind, record.id);
    tree.node_mut(id).ial = record.ial;
    tree.append_child(parent, id);
    for child in record.children {
        attach(tree, id, child);
    }
}
