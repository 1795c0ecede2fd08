//! ReactiveSession: a document, its live tree and the dependency graph that
//! ties them together.
//!
//! Writes go through the session so it can consult the graph. A write that
//! only touches displayed values refreshes the affected nodes in place. A
//! write that replaces a path some node is structured by (the array behind a
//! `forEach`) re-resolves the whole document against the live state.

use crate::document::value::StateValue;
use crate::document::Document;
use crate::ir::{NodeId, RenderTree};
use crate::resolve::{ResolutionError, Resolver};
use crate::state::{StateChange, StateError, StatePath, StateStore, SubscriptionId};

use super::tracker::DependencyGraph;

/// Errors from a session write.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("re-resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
}

/// What one write did to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateUpdate {
    /// Nodes depending on the written path. After a rebuild this is the new
    /// root: every previous id is stale.
    pub affected: Vec<NodeId>,
    /// Affected nodes whose displayed value actually changed.
    pub changed: Vec<NodeId>,
    /// Whether the tree was re-resolved.
    pub rebuilt: bool,
}

#[derive(Debug)]
pub struct ReactiveSession {
    document: Document,
    resolver: Resolver,
    tree: RenderTree,
    graph: DependencyGraph,
}

impl ReactiveSession {
    /// Resolve `document` with the built-in registries.
    pub fn new(document: Document) -> Result<Self, ResolutionError> {
        Self::with_resolver(document, Resolver::new())
    }

    pub fn with_resolver(document: Document, resolver: Resolver) -> Result<Self, ResolutionError> {
        let (tree, graph) = resolver.resolve_with_tracking(&document)?;
        Ok(Self {
            document,
            resolver,
            tree,
            graph,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn state(&self) -> &StateStore {
        &self.tree.state
    }

    pub fn get(&self, path: &str) -> Option<&StateValue> {
        self.tree.state.get(path)
    }

    /// Write `value` at `path` and bring the tree up to date.
    pub fn set(
        &mut self,
        path: &str,
        value: impl Into<StateValue>,
    ) -> Result<StateUpdate, SessionError> {
        let path = StatePath::parse(path)?;
        let grown = self.tree.state.array_growth(&path);
        self.tree.state.set_path(&path, value.into())?;
        self.propagate_write(&path, grown.as_ref())
    }

    /// Flip the boolean at `path` and bring the tree up to date.
    pub fn toggle(&mut self, path: &str) -> Result<StateUpdate, SessionError> {
        let path = StatePath::parse(path)?;
        let next = !self
            .tree
            .state
            .get_path(&path)
            .and_then(StateValue::as_bool)
            .unwrap_or(false);
        let grown = self.tree.state.array_growth(&path);
        self.tree.state.set_path(&path, StateValue::Bool(next))?;
        self.propagate_write(&path, grown.as_ref())
    }

    /// Register a change callback on the live store.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&StateChange<'_>) + 'static,
    ) -> SubscriptionId {
        self.tree.state.on_state_change(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.tree.state.remove_state_change_callback(id)
    }

    /// Apply the consequences of a write to `written`.
    pub fn propagate(&mut self, written: &StatePath) -> Result<StateUpdate, SessionError> {
        self.propagate_write(written, None)
    }

    /// Like [`propagate`](Self::propagate), where the write also created or
    /// lengthened the array at `grown`. That counts as a structural write to
    /// `grown`, since a `forEach` over it now has a different count.
    fn propagate_write(
        &mut self,
        written: &StatePath,
        grown: Option<&StatePath>,
    ) -> Result<StateUpdate, SessionError> {
        let structural = |path: &StatePath| !self.graph.structure_affected(path).is_empty();
        if structural(written) || grown.is_some_and(structural) {
            self.rebuild()?;
            tracing::debug!(path = %written, "structural write, document re-resolved");
            return Ok(StateUpdate {
                affected: vec![self.tree.root()],
                changed: vec![self.tree.root()],
                rebuilt: true,
            });
        }

        let affected = self.graph.affected(written);
        let changed: Vec<NodeId> = affected
            .iter()
            .copied()
            .filter(|&id| self.tree.refresh_node(id))
            .collect();
        tracing::debug!(
            path = %written,
            affected = affected.len(),
            changed = changed.len(),
            "state write propagated"
        );
        Ok(StateUpdate {
            affected,
            changed,
            rebuilt: false,
        })
    }

    /// Re-resolve the document against the live store. Subscriptions and
    /// values move to the new tree; on failure the old tree is kept.
    fn rebuild(&mut self) -> Result<(), ResolutionError> {
        let (mut tree, graph) = self
            .resolver
            .build(&self.document, &self.tree.state, true)?;
        tree.state = std::mem::take(&mut self.tree.state);
        self.tree = tree;
        self.graph = graph;
        Ok(())
    }
}
