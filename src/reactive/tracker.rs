//! DependencyGraph: which IR nodes read which state paths.
//!
//! Built alongside the tree during a tracked resolution and consulted on
//! every state write. The graph only holds node ids; it never owns nodes.

use std::collections::{BTreeMap, BTreeSet};

use slotmap::SecondaryMap;

use crate::ir::{NodeId, RenderTree};
use crate::state::StatePath;

/// How a node depends on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    /// The node displays the value. Any write inside or above the path, or
    /// below it, can change what it shows.
    Value,
    /// The path decides the node's shape, e.g. the array a `forEach`
    /// expands. Only a write that replaces the path itself (or an ancestor)
    /// affects it.
    Structure,
}

impl DependencyKind {
    /// Whether a write to `written` affects a dependency of this kind on `path`.
    pub fn is_affected(self, path: &StatePath, written: &StatePath) -> bool {
        match self {
            Self::Value => path.overlaps(written),
            Self::Structure => path.starts_with(written),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    path: StatePath,
    node: NodeId,
    kind: DependencyKind,
}

/// Bipartite path → node index.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Edges grouped by the first key of their path.
    by_root: BTreeMap<String, Vec<Edge>>,
    by_node: SecondaryMap<NodeId, Vec<(StatePath, DependencyKind)>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` depends on `path`. Duplicate records are ignored.
    pub fn record(&mut self, path: StatePath, node: NodeId, kind: DependencyKind) {
        let Some(root) = path.root_key().map(str::to_owned) else {
            return;
        };
        let entry = (path.clone(), kind);
        let node_paths = match self.by_node.entry(node) {
            Some(slot) => slot.or_default(),
            None => return,
        };
        if node_paths.contains(&entry) {
            return;
        }
        node_paths.push(entry);
        self.by_root
            .entry(root)
            .or_default()
            .push(Edge { path, node, kind });
    }

    /// Nodes affected by a write to `written`, in recording order.
    pub fn affected(&self, written: &StatePath) -> Vec<NodeId> {
        self.matching(written, |_| true)
    }

    /// Nodes whose structure is affected by a write to `written`.
    pub fn structure_affected(&self, written: &StatePath) -> Vec<NodeId> {
        self.matching(written, |kind| kind == DependencyKind::Structure)
    }

    /// [`affected`](Self::affected) without nodes that have an affected
    /// ancestor: the minimal set of subtrees to re-resolve.
    pub fn affected_roots(&self, written: &StatePath, tree: &RenderTree) -> Vec<NodeId> {
        let affected = self.affected(written);
        let set: BTreeSet<NodeId> = affected.iter().copied().collect();
        affected
            .into_iter()
            .filter(|&node| !tree.ancestors(node).iter().any(|a| set.contains(a)))
            .collect()
    }

    /// Paths `node` depends on.
    pub fn paths_for(&self, node: NodeId) -> &[(StatePath, DependencyKind)] {
        self.by_node.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Forget every dependency of `node`.
    pub fn remove_node(&mut self, node: NodeId) {
        let Some(paths) = self.by_node.remove(node) else {
            return;
        };
        for (path, _) in paths {
            if let Some(edges) = path.root_key().and_then(|root| self.by_root.get_mut(root)) {
                edges.retain(|edge| edge.node != node);
            }
        }
        self.by_root.retain(|_, edges| !edges.is_empty());
    }

    /// Number of recorded (path, node) edges.
    pub fn len(&self) -> usize {
        self.by_root.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_root.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_root.clear();
        self.by_node.clear();
    }

    fn matching(&self, written: &StatePath, keep: impl Fn(DependencyKind) -> bool) -> Vec<NodeId> {
        let Some(edges) = written.root_key().and_then(|root| self.by_root.get(root)) else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        edges
            .iter()
            .filter(|edge| keep(edge.kind) && edge.kind.is_affected(&edge.path, written))
            .filter(|edge| seen.insert(edge.node))
            .map(|edge| edge.node)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use pretty_assertions::assert_eq;

    fn path(s: &str) -> StatePath {
        StatePath::parse(s).unwrap()
    }

    fn ids(n: usize) -> Vec<NodeId> {
        let mut arena: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn value_dependencies_overlap_both_ways() {
        let n = ids(3);
        let mut graph = DependencyGraph::new();
        graph.record(path("user.name"), n[0], DependencyKind::Value);
        graph.record(path("user"), n[1], DependencyKind::Value);
        graph.record(path("userCount"), n[2], DependencyKind::Value);

        assert_eq!(graph.affected(&path("user.name")), vec![n[0], n[1]]);
        assert_eq!(graph.affected(&path("user")), vec![n[0], n[1]]);
        assert_eq!(graph.affected(&path("user.age")), vec![n[1]]);
        assert_eq!(graph.affected(&path("userCount")), vec![n[2]]);
    }

    #[test]
    fn structure_ignores_writes_below_the_path() {
        let n = ids(2);
        let mut graph = DependencyGraph::new();
        graph.record(path("items"), n[0], DependencyKind::Structure);
        graph.record(path("items[0].title"), n[1], DependencyKind::Value);

        assert_eq!(graph.affected(&path("items[0].title")), vec![n[1]]);
        assert_eq!(graph.structure_affected(&path("items[0].title")), vec![]);
        assert_eq!(graph.affected(&path("items")), vec![n[0], n[1]]);
        assert_eq!(graph.structure_affected(&path("items")), vec![n[0]]);
    }

    #[test]
    fn duplicates_are_ignored_and_paths_listed() {
        let n = ids(1);
        let mut graph = DependencyGraph::new();
        graph.record(path("a"), n[0], DependencyKind::Value);
        graph.record(path("a"), n[0], DependencyKind::Value);
        graph.record(path("b"), n[0], DependencyKind::Structure);
        assert_eq!(graph.len(), 2);
        assert_eq!(
            graph.paths_for(n[0]),
            &[
                (path("a"), DependencyKind::Value),
                (path("b"), DependencyKind::Structure)
            ]
        );
    }

    #[test]
    fn remove_node_drops_its_edges() {
        let n = ids(2);
        let mut graph = DependencyGraph::new();
        graph.record(path("a"), n[0], DependencyKind::Value);
        graph.record(path("a"), n[1], DependencyKind::Value);
        graph.remove_node(n[0]);
        assert_eq!(graph.affected(&path("a")), vec![n[1]]);
        assert!(graph.paths_for(n[0]).is_empty());
        graph.remove_node(n[1]);
        assert!(graph.is_empty());
    }
}
