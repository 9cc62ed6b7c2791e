//! Render-order traversal
//!
//! Produces the depth-annotated, flattened sequence a list view renders:
//! siblings in `order`, children of collapsed directories left out. The
//! iterator is lazy and cheap to clone, so a caller can restart it from any
//! point.

use crate::tree::{DocumentTree, Node, NodeId};
use std::collections::BTreeSet;

/// Depth-first walk over the visible part of the tree
#[derive(Debug, Clone)]
pub struct Visible<'a> {
    tree: &'a DocumentTree,
    expanded: &'a BTreeSet<NodeId>,
    // Pending nodes, next one on top
    stack: Vec<(NodeId, usize)>,
}

impl<'a> Visible<'a> {
    /// Walk the whole forest, starting from the roots
    pub fn new(tree: &'a DocumentTree, expanded: &'a BTreeSet<NodeId>) -> Self {
        Self::under(tree, expanded, None)
    }

    /// Walk the visible descendants of `parent` (or the roots when `None`).
    /// Direct children of `parent` are listed at depth 0 whether or not
    /// `parent` itself is expanded.
    pub fn under(
        tree: &'a DocumentTree,
        expanded: &'a BTreeSet<NodeId>,
        parent: Option<NodeId>,
    ) -> Self {
        let mut visible = Self {
            tree,
            expanded,
            stack: Vec::new(),
        };
        visible.push_children(parent, 0);
        visible
    }

    fn push_children(&mut self, parent: Option<NodeId>, depth: usize) {
        self.stack.extend(
            self.tree
                .child_ids(parent)
                .iter()
                .rev()
                .map(|id| (*id, depth)),
        );
    }
}

impl<'a> Iterator for Visible<'a> {
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, depth) = self.stack.pop()?;
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if node.is_dir() && self.expanded.contains(&id) {
                self.push_children(Some(id), depth + 1);
            }
            return Some((node, depth));
        }
    }
}

/// A visible row, detached from the tree so it can outlive a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleItem {
    pub id: NodeId,
    pub name: String,
    pub depth: usize,
    pub is_dir: bool,
    pub is_expanded: bool,
    pub menu_open: bool,
}

/// Collect the visible rows, marking the node whose menu is open
pub fn visible_items(
    tree: &DocumentTree,
    expanded: &BTreeSet<NodeId>,
    active_menu: Option<NodeId>,
) -> Vec<VisibleItem> {
    Visible::new(tree, expanded)
        .map(|(node, depth)| VisibleItem {
            id: node.id,
            name: node.name.clone(),
            depth,
            is_dir: node.is_dir(),
            is_expanded: node.is_dir() && expanded.contains(&node.id),
            menu_open: active_menu == Some(node.id),
        })
        .collect()
}
