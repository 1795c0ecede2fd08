//! RenderTree: the IR arena plus the actions, state and diagnostics that
//! travel with it.

use std::collections::BTreeMap;

use slotmap::{SecondaryMap, SlotMap};

use crate::actions::ResolvedAction;
use crate::document::node::{Alignment, StackKind};
use crate::resolve::ResolutionError;
use crate::state::StateStore;
use crate::style::FlatStyle;

use super::node::{ContainerNode, NodeId, RenderNode, RenderNodeKind, RootNode};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The resolved document.
///
/// Nodes live in a single `SlotMap`; parent/child relationships are stored in
/// secondary maps. The tree owns its nodes exclusively. The arena root is the
/// vertical container holding the root component's children.
#[derive(Debug)]
pub struct RenderTree {
    nodes: SlotMap<NodeId, RenderNode>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: NodeId,
    pub root_node: RootNode,
    pub actions: BTreeMap<String, ResolvedAction>,
    pub state: StateStore,
    /// Recoverable problems met during resolution, in encounter order.
    pub diagnostics: Vec<ResolutionError>,
}

impl RenderTree {
    /// Create a tree whose arena holds only `root`.
    pub fn new(root_node: RootNode, root: RenderNode, state: StateStore) -> Self {
        let mut nodes = SlotMap::with_key();
        let root_id = nodes.insert(root);
        let mut children = SecondaryMap::new();
        children.insert(root_id, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            root: root_id,
            root_node,
            actions: BTreeMap::new(),
            state,
            diagnostics: Vec::new(),
        }
    }

    /// The result of a failed top-level resolution: an empty root container,
    /// no actions and empty state.
    pub fn empty() -> Self {
        Self::new(
            RootNode::default(),
            RenderNode::new(RenderNodeKind::Container(ContainerNode {
                axis: StackKind::Vertical,
                alignment: Alignment::Center,
                style: FlatStyle::default(),
            })),
            StateStore::new(),
        )
    }

    /// Insert a detached node. Attach it with [`append_child`](Self::append_child).
    pub fn insert(&mut self, node: RenderNode) -> NodeId {
        let id = self.nodes.insert(node);
        self.children.insert(id, Vec::new());
        id
    }

    /// Attach a detached node as the last child of `parent`.
    ///
    /// Returns `false` if either node is missing or `child` already has a
    /// parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if child == parent
            || !self.nodes.contains_key(child)
            || self.parent.contains_key(child)
            || child == self.root
        {
            return false;
        }
        match self.children.get_mut(parent) {
            Some(siblings) => {
                siblings.push(child);
                self.parent.insert(child, parent);
                true
            }
            None => false,
        }
    }

    /// Insert a node as the last child of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, node: RenderNode) -> NodeId {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        let id = self.insert(node);
        self.append_child(parent, id);
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Children of a node. Empty if the node has none or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    pub fn get(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds at least its root container.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// First node, in document order, with the given author id.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.walk_depth_first(self.root)
            .into_iter()
            .find(|&node| self.nodes[node].id.as_deref() == Some(id))
    }

    /// Re-evaluate the bound values of one node against the tree's state.
    /// Returns whether anything changed.
    pub fn refresh_node(&mut self, id: NodeId) -> bool {
        let state = &self.state;
        match self.nodes.get_mut(id) {
            Some(node) => node.kind.refresh(state),
            None => false,
        }
    }
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::value::StateValue;
    use crate::ir::binding::BoundValue;
    use crate::ir::node::TextNode;
    use pretty_assertions::assert_eq;

    fn text(content: &str) -> RenderNode {
        RenderNode::new(RenderNodeKind::Text(TextNode {
            content: BoundValue::literal(content),
            style: FlatStyle::default(),
        }))
    }

    fn container() -> RenderNode {
        RenderNode::new(RenderNodeKind::Container(ContainerNode {
            axis: StackKind::Horizontal,
            alignment: Alignment::Leading,
            style: FlatStyle::default(),
        }))
    }

    /// ```text
    ///       root
    ///      /    \
    ///     a      b
    ///    / \
    ///   c   d
    /// ```
    fn sample() -> (RenderTree, [NodeId; 5]) {
        let mut tree = RenderTree::empty();
        let root = tree.root();
        let a = tree.insert_child(root, container());
        let b = tree.insert_child(root, text("b"));
        let c = tree.insert_child(a, text("c").with_id(Some("c".into())));
        let d = tree.insert_child(a, text("d"));
        (tree, [root, a, b, c, d])
    }

    #[test]
    fn empty_tree_has_only_root() {
        let tree = RenderTree::empty();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert!(tree.actions.is_empty());
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn parent_child_links() {
        let (tree, [root, a, b, c, d]) = sample();
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.children(a), &[c, d]);
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.ancestors(d), vec![a, root]);
    }

    #[test]
    fn detached_insert_then_append() {
        let (mut tree, [root, a, _, c, _]) = sample();
        let e = tree.insert(text("e"));
        assert_eq!(tree.parent(e), None);
        assert!(!tree.walk_depth_first(root).contains(&e));

        assert!(tree.append_child(a, e));
        assert_eq!(tree.children(a).last(), Some(&e));
        assert_eq!(tree.parent(e), Some(a));

        assert!(!tree.append_child(root, e));
        assert!(!tree.append_child(c, root));
    }

    #[test]
    fn depth_first_order() {
        let (tree, [root, a, b, c, d]) = sample();
        assert_eq!(tree.walk_depth_first(root), vec![root, a, c, d, b]);
    }

    #[test]
    fn find_by_author_id() {
        let (tree, [_, _, _, c, _]) = sample();
        assert_eq!(tree.find_by_id("c"), Some(c));
        assert_eq!(tree.find_by_id("zzz"), None);
    }

    #[test]
    fn refresh_node_reads_tree_state() {
        let mut tree = RenderTree::empty();
        tree.state.set("name", "Ada").unwrap();
        let root = tree.root();
        let id = tree.insert_child(
            root,
            RenderNode::new(RenderNodeKind::Text(TextNode {
                content: BoundValue::Binding {
                    path: "name".into(),
                    current: StateValue::from("Ada"),
                },
                style: FlatStyle::default(),
            })),
        );
        tree.state.set("name", "Grace").unwrap();
        assert!(tree.refresh_node(id));
        let Some(RenderNodeKind::Text(node)) = tree.get(id).map(|n| &n.kind) else {
            panic!("expected text node");
        };
        assert_eq!(node.content.text(), "Grace");
    }
}
