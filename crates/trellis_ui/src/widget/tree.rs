//! Node tree for hierarchical scene management.

use std::collections::HashMap;

use super::{Node, NodeId};

/// Manages the node hierarchy.
///
/// Nodes live in one arena keyed by [`NodeId`]; parents and children refer
/// to each other by handle only.
pub struct NodeTree {
    /// Nodes indexed by handle.
    nodes: HashMap<NodeId, Node>,
    /// Root handles in declaration order.
    roots: Vec<NodeId>,
    /// Parent-child relationships, in declaration order.
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Counter for generating unique handles.
    next_id: u64,
}

impl NodeTree {
    /// Creates a new empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::with_capacity(64),
            roots: Vec::with_capacity(8),
            children: HashMap::with_capacity(64),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a root node and returns its handle.
    pub fn insert_root(&mut self, mut node: Node) -> NodeId {
        let id = self.next_id();
        node.handle = id;
        node.parent = None;
        self.nodes.insert(id, node);
        self.roots.push(id);
        self.children.insert(id, Vec::new());
        id
    }

    /// Appends a child to `parent` and returns its handle.
    ///
    /// Returns `None` if `parent` is not in the tree.
    pub fn insert_child(&mut self, parent: NodeId, mut node: Node) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = self.next_id();
        node.handle = id;
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        self.children.entry(parent).or_default().push(id);
        self.children.insert(id, Vec::new());
        Some(id)
    }

    /// Removes a node and all its descendants, returning the node itself.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        if let Some(children) = self.children.remove(&id) {
            for child in children {
                self.remove(child);
            }
        }

        let node = self.nodes.remove(&id)?;
        match node.parent {
            Some(parent) => {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
        Some(node)
    }

    /// Gets a node by handle.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Gets mutable access to a node.
    #[must_use]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Returns true if `id` is in the tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the children of a node in declaration order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns all root nodes in declaration order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.children.clear();
    }

    /// Finds the first node with declared `id` in depth-first order.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.iter_dfs().find(|handle| self.nodes.get(handle).is_some_and(|n| n.id == id))
    }

    /// Returns true if the node and all its ancestors are not hidden.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(handle) = cursor {
            match self.nodes.get(&handle) {
                Some(node) if !node.hidden => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Returns all node handles in depth-first pre-order (declaration order).
    pub fn iter_dfs(&self) -> impl Iterator<Item = NodeId> + '_ {
        NodeDfsIterator {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Returns all node handles in reverse depth-first order, so nested
    /// and later-declared nodes come first (for hit testing).
    pub fn iter_reverse(&self) -> impl Iterator<Item = NodeId> + '_ {
        let all: Vec<_> = self.iter_dfs().collect();
        all.into_iter().rev()
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first iterator over the node tree.
struct NodeDfsIterator<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl Iterator for NodeDfsIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;

        // Reverse push keeps siblings left-to-right.
        if let Some(children) = self.tree.children.get(&id) {
            self.stack.extend(children.iter().rev().copied());
        }

        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (NodeTree, [NodeId; 4]) {
        let mut tree = NodeTree::new();
        let root = tree.insert_root(Node::new("root", "basic"));
        let a = tree.insert_child(root, Node::new("a", "basic")).unwrap();
        let a1 = tree.insert_child(a, Node::new("dup", "basic")).unwrap();
        let b = tree.insert_child(root, Node::new("dup", "basic")).unwrap();
        (tree, [root, a, a1, b])
    }

    #[test]
    fn test_tree_hierarchy() {
        let (tree, [root, a, a1, b]) = sample();

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.roots(), &[root]);
        assert_eq!(tree.get(a1).unwrap().parent(), Some(a));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_traversal_orders() {
        let (tree, [root, a, a1, b]) = sample();

        assert_eq!(tree.iter_dfs().collect::<Vec<_>>(), vec![root, a, a1, b]);
        assert_eq!(tree.iter_reverse().collect::<Vec<_>>(), vec![b, a1, a, root]);
    }

    #[test]
    fn test_find_first_match_in_nested_children() {
        let (tree, [_, _, a1, _]) = sample();
        assert_eq!(tree.find("dup"), Some(a1));
        assert_eq!(tree.find("ghost"), None);
    }

    #[test]
    fn test_remove_subtree() {
        let (mut tree, [root, a, a1, b]) = sample();

        let removed = tree.remove(a).unwrap();
        assert_eq!(removed.id, "a");
        assert!(!tree.contains(a1));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.find("dup"), Some(b));
    }

    #[test]
    fn test_hidden_ancestor_hides_subtree() {
        let (mut tree, [_, a, a1, b]) = sample();
        tree.get_mut(a).unwrap().hidden = true;

        assert!(!tree.is_visible(a1));
        assert!(tree.is_visible(b));
    }

    #[test]
    fn test_insert_child_of_missing_parent() {
        let mut tree = NodeTree::new();
        assert!(tree.insert_child(NodeId::new(99), Node::new("x", "basic")).is_none());
        assert!(tree.is_empty());
    }
}
