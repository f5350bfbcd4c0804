//! Arena-backed document tree.
//!
//! A [`Tree`] owns every node of one document. Nodes refer to each other through
//! [`NodeId`] indices, so structural edits never invalidate other handles. Unlinked nodes
//! stay in the arena but are no longer reachable from the root.
//!
//! Traversal and structural mutation are kept apart: [`Tree::walk`] borrows the tree
//! immutably, so callers collect the nodes they want to change and apply
//! [`Tree::insert_before`] or [`Tree::unlink`] once the walk is over.

use std::collections::HashMap;

use serde::Serialize;

use crate::node::{Node, NodeId, NodeKind};

/// Visitor verdict for [`Tree::walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    /// Descend into the node's children.
    Continue,
    /// Skip the node's children but keep walking.
    SkipChildren,
    /// Stop the walk.
    Stop,
}

/// One breadcrumb entry from a document root down to a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    /// Block ID.
    pub id: String,
    /// Display name: document title, heading text, or a short content excerpt.
    pub name: String,
    /// Block type code.
    #[serde(rename = "type")]
    pub kind: String,
    /// Block subtype (`h1`..`h6` for headings, empty otherwise).
    #[serde(rename = "subType")]
    pub sub_kind: String,
}

/// Maximum characters kept in a breadcrumb name for non-heading blocks.
const PATH_NAME_MAX_CHARS: usize = 24;

/// A parsed document.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Document (root block) ID.
    pub id: String,
    /// Box (notebook) the document belongs to.
    pub box_id: String,
    /// Storage path of the document inside its box, e.g. `/2023.../2023....sy`.
    pub path: String,
    /// Human readable path, e.g. `/Projects/Plan`.
    pub hpath: String,
    /// Node arena.
    nodes: Vec<Node>,
    /// The document node.
    root: NodeId,
}

impl Tree {
    /// Creates a tree holding only its document node.
    pub fn new(
        id: impl Into<String>,
        box_id: impl Into<String>,
        path: impl Into<String>,
        hpath: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let root = Node::new(NodeKind::Document, Some(id.clone()));
        Self {
            id,
            box_id: box_id.into(),
            path: path.into(),
            hpath: hpath.into(),
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Returns the document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns a node by handle.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Returns a node by handle, mutably.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Returns the document title (the root's `title` attribute).
    pub fn title(&self) -> &str {
        self.node(self.root).attr("title").unwrap_or_default()
    }

    /// Sets the document title.
    pub fn set_title(&mut self, title: &str) {
        let root = self.root;
        self.node_mut(root).set_attr("title", title);
    }

    /// Allocates a detached node.
    pub fn new_node(&mut self, kind: NodeKind, block_id: Option<String>) -> NodeId {
        self.nodes.push(Node::new(kind, block_id));
        NodeId(self.nodes.len() - 1)
    }

    /// Allocates a node and appends it as the last child of `parent`.
    pub fn append_new(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        block_id: Option<&str>,
    ) -> NodeId {
        let child = self.new_node(kind, block_id.map(str::to_string));
        self.append_child(parent, child);
        child
    }

    /// Appends a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.0].last_child;
        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev = last;
            node.next = None;
        }
        match last {
            Some(last) => self.nodes[last.0].next = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Inserts a detached node immediately before `target`.
    pub fn insert_before(&mut self, target: NodeId, new: NodeId) {
        let parent = self.nodes[target.0].parent;
        let prev = self.nodes[target.0].prev;
        {
            let node = &mut self.nodes[new.0];
            node.parent = parent;
            node.prev = prev;
            node.next = Some(target);
        }
        self.nodes[target.0].prev = Some(new);
        match prev {
            Some(prev) => self.nodes[prev.0].next = Some(new),
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = Some(new);
                }
            }
        }
    }

    /// Detaches a node (with its subtree) from its parent and siblings.
    pub fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.0];
            (node.parent, node.prev, node.next)
        };
        match prev {
            Some(prev) => self.nodes[prev.0].next = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.0].prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = prev;
                }
            }
        }
        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev = None;
        node.next = None;
    }

    /// Returns the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Returns the next sibling of a node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    /// Returns the previous sibling of a node.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev
    }

    /// Returns the first child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    /// Returns the children of a node in order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.nodes[id.0].first_child;
        while let Some(c) = cur {
            out.push(c);
            cur = self.nodes[c.0].next;
        }
        out
    }

    /// Walks the subtree rooted at `start` depth-first in document order.
    ///
    /// The visitor sees each node before its children.
    pub fn walk<F>(&self, start: NodeId, mut visit: F)
    where
        F: FnMut(NodeId, &Node) -> WalkStatus,
    {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            match visit(id, &self.nodes[id.0]) {
                WalkStatus::Stop => return,
                WalkStatus::SkipChildren => continue,
                WalkStatus::Continue => {}
            }
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
    }

    /// Returns the subtree rooted at `start` in depth-first document order.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(start, |id, _| {
            out.push(id);
            WalkStatus::Continue
        });
        out
    }

    /// Finds the node carrying a block ID.
    pub fn find_block(&self, block_id: &str) -> Option<NodeId> {
        let mut found = None;
        self.walk(self.root, |id, node| {
            if node.id.as_deref() == Some(block_id) {
                found = Some(id);
                return WalkStatus::Stop;
            }
            WalkStatus::Continue
        });
        found
    }

    /// Returns the ancestors of a node, root first, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out.reverse();
        out
    }

    /// Concatenates the text of every node in the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.walk(id, |_, node| {
            if let Some(text) = node.kind.own_text() {
                out.push_str(text);
            }
            WalkStatus::Continue
        });
        out
    }

    /// Returns the first non-container block inside `id`, or `id` itself when it is a leaf
    /// block.
    pub fn first_leaf_block(&self, id: NodeId) -> Option<NodeId> {
        let mut found = None;
        self.walk(id, |nid, node| {
            if node.kind.is_block() && !node.kind.is_container() {
                found = Some(nid);
                return WalkStatus::Stop;
            }
            if node.kind.is_block() {
                WalkStatus::Continue
            } else {
                WalkStatus::SkipChildren
            }
        });
        found
    }

    /// Returns the blocks belonging to a heading's section: the following siblings up to
    /// the next heading of the same or a higher level.
    ///
    /// Returns an empty list when `heading` is not a heading.
    pub fn heading_section(&self, heading: NodeId) -> Vec<NodeId> {
        let NodeKind::Heading { level } = self.nodes[heading.0].kind else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cur = self.next_sibling(heading);
        while let Some(id) = cur {
            if let NodeKind::Heading { level: next_level } = self.nodes[id.0].kind
                && next_level <= level
            {
                break;
            }
            out.push(id);
            cur = self.next_sibling(id);
        }
        out
    }

    /// Assigns increasing indices to block nodes in depth-first document order.
    ///
    /// Returns a map from block ID to its content-order index.
    pub fn content_order(&self) -> HashMap<String, usize> {
        let mut order = HashMap::new();
        let mut next = 0;
        self.walk(self.root, |_, node| {
            if node.kind.is_block()
                && let Some(ref id) = node.id
            {
                order.insert(id.clone(), next);
                next += 1;
            }
            WalkStatus::Continue
        });
        order
    }

    /// Builds the breadcrumb from the document root down to `id`, including `id`.
    pub fn block_path(&self, id: NodeId) -> Vec<PathEntry> {
        let mut chain = self.ancestors(id);
        chain.push(id);
        chain
            .into_iter()
            .filter_map(|nid| self.path_entry(nid))
            .collect()
    }

    /// Creates a breadcrumb entry for a block node.
    fn path_entry(&self, id: NodeId) -> Option<PathEntry> {
        let node = self.node(id);
        let kind = node.kind.type_code()?;
        let block_id = node.id.clone()?;
        let (name, sub_kind) = match node.kind {
            NodeKind::Document => (self.title().to_string(), String::new()),
            NodeKind::Heading { level } => (self.text_content(id), format!("h{level}")),
            _ => {
                let text = self.text_content(id);
                (text.chars().take(PATH_NAME_MAX_CHARS).collect(), String::new())
            }
        };
        Some(PathEntry {
            id: block_id,
            name,
            kind: kind.to_string(),
            sub_kind,
        })
    }
}
