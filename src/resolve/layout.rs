//! Containers, spacers and `forEach` expansion.

use crate::document::node as doc;
use crate::document::value::StateValue;
use crate::expr::ScopeEntry;
use crate::ir::{ContainerNode, NodeId, RenderNode, RenderNodeKind, Slot, SpacerNode};
use crate::style::NodeOverrides;

use super::error::ResolutionError;
use super::resolver::Builder;

impl Builder<'_> {
    pub(super) fn container(
        &mut self,
        parent: NodeId,
        node: &doc::ContainerNode,
        slot: Slot,
    ) -> Result<NodeId, ResolutionError> {
        let style = self.ctx.flat_style_with(
            node.style_id.as_deref(),
            node.style.as_ref(),
            NodeOverrides {
                padding: node.padding.as_ref(),
                spacing: node.spacing,
                ..NodeOverrides::default()
            },
        );
        let container = RenderNode::new(RenderNodeKind::Container(ContainerNode {
            axis: node.kind,
            alignment: node.alignment.unwrap_or_default(),
            style,
        }))
        .with_id(node.id.clone())
        .in_slot(slot);
        let id = self.insert(parent, container);
        self.children(id, &node.children)?;
        Ok(id)
    }

    pub(super) fn spacer(&mut self, parent: NodeId, node: &doc::SpacerNode, slot: Slot) -> NodeId {
        let spacer = RenderNode::new(RenderNodeKind::Spacer(SpacerNode {
            min_length: node.min_length,
            width: node.width,
            height: node.height,
        }))
        .in_slot(slot);
        self.insert(parent, spacer)
    }

    /// Expand a `forEach` into a container with one resolved template per
    /// item. An absent or empty array yields the `emptyView` itself when
    /// there is one, otherwise an empty container.
    ///
    /// The node produced depends structurally on the array path: replacing
    /// the array changes how many children it has.
    pub(super) fn for_each(
        &mut self,
        parent: NodeId,
        node: &doc::ForEachNode,
        slot: Slot,
    ) -> Result<NodeId, ResolutionError> {
        let (items, source) = self.ctx.array_at(&node.items);

        if items.is_empty() {
            if let Some(empty_view) = &node.empty_view {
                tracing::debug!(items = %node.items, "forEach is empty, resolving emptyView");
                return self.node(parent, empty_view, slot);
            }
        }

        let style = self.ctx.flat_style_with(
            None,
            None,
            NodeOverrides {
                padding: node.padding.as_ref(),
                spacing: node.spacing,
                ..NodeOverrides::default()
            },
        );
        let container = RenderNode::new(RenderNodeKind::Container(ContainerNode {
            axis: node.layout,
            alignment: node.alignment.unwrap_or_default(),
            style,
        }))
        .with_id(node.id.clone())
        .in_slot(slot);
        let id = self.insert(parent, container);

        tracing::debug!(items = %node.items, count = items.len(), "expanding forEach");
        for (index, item) in items.into_iter().enumerate() {
            self.ctx.push_scope([
                (
                    node.item_variable.clone(),
                    ScopeEntry::new(item, source.clone().map(|path| path.index(index))),
                ),
                (
                    node.index_variable.clone(),
                    ScopeEntry::new(StateValue::from(index), None),
                ),
            ]);
            let result = self.node(id, &node.template, Slot::Item);
            self.ctx.pop_scope();
            result?;
        }
        Ok(id)
    }
}
