//! Section layouts: heterogeneous lists of rails, lists, grids and flows.

use crate::document::node::{SectionDefinition, SectionLayoutConfig, SectionLayoutNode};
use crate::ir::{
    NodeId, RenderNode, RenderNodeKind, SectionConfig, SectionLayoutNode as SectionLayoutIr,
    SectionNode, Slot,
};
use crate::style::EdgeInsets;

use super::error::ResolutionError;
use super::resolver::Builder;

impl From<&SectionLayoutConfig> for SectionConfig {
    fn from(layout: &SectionLayoutConfig) -> Self {
        SectionConfig {
            kind: layout.kind,
            columns: layout.columns,
            item_spacing: layout.item_spacing.unwrap_or(0.0),
            line_spacing: layout.line_spacing.unwrap_or(0.0),
            content_insets: EdgeInsets::resolve(layout.content_insets.as_ref(), None),
            alignment: layout.alignment.unwrap_or_default(),
            show_indicators: layout.show_indicators,
            is_paging_enabled: layout.is_paging_enabled,
            snap_behavior: layout.snap_behavior,
            show_dividers: layout.show_dividers,
        }
    }
}

impl Builder<'_> {
    pub(super) fn section_layout(
        &mut self,
        parent: NodeId,
        node: &SectionLayoutNode,
        slot: Slot,
    ) -> Result<NodeId, ResolutionError> {
        let layout = RenderNode::new(RenderNodeKind::SectionLayout(SectionLayoutIr {
            section_spacing: node.section_spacing.unwrap_or(0.0),
        }))
        .with_id(node.id.clone())
        .in_slot(slot);
        let id = self.insert(parent, layout);
        for section in &node.sections {
            self.ctx.enter()?;
            let result = self.section(id, section);
            self.ctx.leave();
            result?;
        }
        Ok(id)
    }

    /// One section: header, items, footer, in that order among its children.
    fn section(
        &mut self,
        layout: NodeId,
        section: &SectionDefinition,
    ) -> Result<NodeId, ResolutionError> {
        let node = RenderNode::new(RenderNodeKind::Section(SectionNode {
            config: SectionConfig::from(&section.layout),
            sticky_header: section.sticky_header,
        }))
        .with_id(section.id.clone());
        let id = self.insert(layout, node);

        if let Some(header) = &section.header {
            self.node(id, header, Slot::Header)?;
        }
        self.children(id, &section.children)?;
        if let Some(footer) = &section.footer {
            self.node(id, footer, Slot::Footer)?;
        }
        Ok(id)
    }
}
