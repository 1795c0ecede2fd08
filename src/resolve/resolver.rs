//! Resolver: turns a [`Document`] into a [`RenderTree`].
//!
//! Resolution is a single synchronous walk. The root is resolved first, then
//! every child through [`Builder::node`], which dispatches on the node kind.
//! Layout nodes recurse; leaf components go through the
//! [`ComponentResolverRegistry`].

use crate::actions::ActionResolverRegistry;
use crate::components::ComponentResolverRegistry;
use crate::config::ResolverConfig;
use crate::document::node::{Component, Node, StackKind};
use crate::document::{Document, RootComponent};
use crate::ir::{ContainerNode, NodeId, RenderNode, RenderNodeKind, RenderTree, RootNode, Slot};
use crate::reactive::DependencyGraph;
use crate::state::StateStore;
use crate::style::{EdgeInsets, FlatStyle, NodeOverrides};

use super::context::ResolutionContext;
use super::error::ResolutionError;

/// Document → IR compiler. Holds the registries and limits; one resolver can
/// compile any number of documents.
#[derive(Debug)]
pub struct Resolver {
    components: ComponentResolverRegistry,
    actions: ActionResolverRegistry,
    config: ResolverConfig,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            components: ComponentResolverRegistry::with_defaults(),
            actions: ActionResolverRegistry::with_defaults(),
            config: ResolverConfig::default(),
        }
    }
}

impl Resolver {
    /// A resolver with the built-in components and actions.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_components(mut self, components: ComponentResolverRegistry) -> Self {
        self.components = components;
        self
    }

    pub fn with_actions(mut self, actions: ActionResolverRegistry) -> Self {
        self.actions = actions;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn components_mut(&mut self) -> &mut ComponentResolverRegistry {
        &mut self.components
    }

    pub fn actions_mut(&mut self) -> &mut ActionResolverRegistry {
        &mut self.actions
    }

    /// Resolve `document` against a fresh store seeded from its `state`.
    pub fn resolve(&self, document: &Document) -> Result<RenderTree, ResolutionError> {
        let state = StateStore::with_values(document.state.clone());
        let (mut tree, _) = self.build(document, &state, self.config.track_dependencies)?;
        tree.state = state;
        Ok(tree)
    }

    /// Resolve and record which state paths every node reads.
    pub fn resolve_with_tracking(
        &self,
        document: &Document,
    ) -> Result<(RenderTree, DependencyGraph), ResolutionError> {
        let state = StateStore::with_values(document.state.clone());
        let (mut tree, graph) = self.build(document, &state, true)?;
        tree.state = state;
        Ok((tree, graph))
    }

    /// [`resolve`](Self::resolve), falling back to [`RenderTree::empty`].
    pub fn resolve_or_empty(&self, document: &Document) -> RenderTree {
        self.resolve(document).unwrap_or_else(|err| {
            tracing::warn!(document = %document.id, error = %err, "resolution failed, using empty tree");
            RenderTree::empty()
        })
    }

    /// Resolve against an existing store. The returned tree holds an empty
    /// store; the caller moves the live one in.
    pub(crate) fn build(
        &self,
        document: &Document,
        state: &StateStore,
        track: bool,
    ) -> Result<(RenderTree, DependencyGraph), ResolutionError> {
        let config = self.config.clone().with_dependency_tracking(track);
        let (actions, failures) = self
            .actions
            .resolve_all(&document.actions, config.max_action_depth);

        let mut ctx = ResolutionContext::new(document, state, &self.actions, &config);
        ctx.extend_diagnostics(
            failures
                .into_iter()
                .map(|(action_id, source)| ResolutionError::Action { action_id, source }),
        );

        let root_node = root_node(&document.root, &mut ctx);
        let root = RenderNode::new(RenderNodeKind::Container(ContainerNode {
            axis: StackKind::Vertical,
            alignment: Default::default(),
            style: root_node.style.clone(),
        }));
        let mut builder = Builder {
            tree: RenderTree::new(root_node, root, StateStore::new()),
            graph: DependencyGraph::new(),
            components: &self.components,
            ctx,
        };
        let root_id = builder.tree.root();
        builder.flush(root_id);
        builder.children(root_id, &document.root.children)?;

        let Builder {
            mut tree,
            graph,
            ctx,
            ..
        } = builder;
        tree.actions = actions;
        tree.diagnostics = ctx.into_diagnostics();
        tracing::debug!(
            document = %document.id,
            nodes = tree.len(),
            dependencies = graph.len(),
            diagnostics = tree.diagnostics.len(),
            "document resolved"
        );
        Ok((tree, graph))
    }
}

/// Root style, background, insets, color scheme and lifecycle actions. The
/// root's `edgeInsets` act as its node-level padding.
fn root_node(root: &RootComponent, ctx: &mut ResolutionContext<'_>) -> RootNode {
    let style = ctx.resolve_style(root.style_id.as_deref(), root.style.as_ref());
    RootNode {
        background_color: root
            .background_color
            .clone()
            .or_else(|| style.background_color.clone()),
        edge_insets: EdgeInsets::resolve(root.edge_insets.as_ref(), style.padding.as_ref()),
        color_scheme: root.color_scheme.unwrap_or_default(),
        style: FlatStyle::flatten(
            &style,
            NodeOverrides {
                padding: root.edge_insets.as_ref(),
                ..NodeOverrides::default()
            },
        ),
        on_appear: ctx.optional_action(root.actions.on_appear.as_ref()),
        on_disappear: ctx.optional_action(root.actions.on_disappear.as_ref()),
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// One resolution pass: the tree under construction, its dependency graph
/// and the context every resolver reads through.
pub(crate) struct Builder<'a> {
    pub(super) tree: RenderTree,
    pub(super) graph: DependencyGraph,
    pub(super) components: &'a ComponentResolverRegistry,
    pub(super) ctx: ResolutionContext<'a>,
}

impl Builder<'_> {
    /// Resolve one document node under `parent`. Returns the id of the
    /// topmost IR node it produced.
    pub(super) fn node(
        &mut self,
        parent: NodeId,
        node: &Node,
        slot: Slot,
    ) -> Result<NodeId, ResolutionError> {
        self.ctx.enter()?;
        let result = match node {
            Node::Container(container) => self.container(parent, container, slot),
            Node::SectionLayout(layout) => self.section_layout(parent, layout, slot),
            Node::ForEach(for_each) => self.for_each(parent, for_each, slot),
            Node::Spacer(spacer) => Ok(self.spacer(parent, spacer, slot)),
            Node::Component(component) => self.component(parent, component, slot),
        };
        self.ctx.leave();
        result
    }

    pub(super) fn children(&mut self, parent: NodeId, nodes: &[Node]) -> Result<(), ResolutionError> {
        for node in nodes {
            self.node(parent, node, Slot::Item)?;
        }
        Ok(())
    }

    /// Insert a node and attach the dependencies recorded while building it.
    pub(super) fn insert(&mut self, parent: NodeId, node: RenderNode) -> NodeId {
        let id = self.tree.insert_child(parent, node);
        self.flush(id);
        id
    }

    fn flush(&mut self, id: NodeId) {
        for (path, kind) in self.ctx.take_pending() {
            self.graph.record(path, id, kind);
        }
    }

    /// A leaf. A failing component resolver leaves an `Unknown` node behind
    /// so siblings still resolve.
    fn component(
        &mut self,
        parent: NodeId,
        component: &Component,
        slot: Slot,
    ) -> Result<NodeId, ResolutionError> {
        let kind = match self.components.resolve(component, &mut self.ctx) {
            Ok(kind) => kind,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                self.ctx.diagnostic(err);
                RenderNodeKind::Unknown {
                    component_type: component.component_type.clone(),
                }
            }
        };
        let node = RenderNode::new(kind)
            .with_id(component.id.clone())
            .in_slot(slot);
        Ok(self.insert(parent, node))
    }
}
