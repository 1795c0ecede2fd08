//! Intermediate representation: the resolved, renderer-agnostic tree.

pub mod binding;
pub mod node;
pub mod tree;

pub use binding::{read_binding, ActionRef, BoundValue};
pub use node::{
    ButtonNode, ContainerNode, CustomNode, DividerNode, GradientKind, GradientNode, GradientStop,
    ImageNode, ImageSource, NodeId, RenderNode, RenderNodeKind, RootNode, SectionConfig,
    SectionLayoutNode, SectionNode, ShapeKind, ShapeNode, SliderNode, Slot, SpacerNode,
    TextFieldNode, TextNode, ToggleNode,
};
pub use tree::RenderTree;
