//! IR node types: NodeId, RenderNode and every node kind.
//!
//! All styling is flattened ([`FlatStyle`]) and every data field is a
//! [`BoundValue`], so renderers never consult the document again.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use crate::document::node::{Alignment, ColumnSpec, SectionKind, SnapBehavior, StackKind};
use crate::document::value::StateValue;
use crate::document::ColorScheme;
use crate::expr::StateReader;
use crate::style::{EdgeInsets, FlatStyle};

use super::binding::{ActionRef, BoundValue};

new_key_type! {
    /// Identifier of a node in a [`RenderTree`](super::RenderTree).
    pub struct NodeId;
}

/// Where a child sits inside its parent. Sections put their header and
/// footer next to the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Item,
    Header,
    Footer,
}

/// One node of the IR tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub kind: RenderNodeKind,
    /// Author-supplied id, if any.
    pub id: Option<String>,
    pub slot: Slot,
}

impl RenderNode {
    pub fn new(kind: RenderNodeKind) -> Self {
        Self {
            kind,
            id: None,
            slot: Slot::Item,
        }
    }

    /// Set the author id (builder).
    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Set the slot (builder).
    pub fn in_slot(mut self, slot: Slot) -> Self {
        self.slot = slot;
        self
    }
}

/// The resolved root component.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootNode {
    pub background_color: Option<String>,
    pub edge_insets: EdgeInsets,
    pub color_scheme: ColorScheme,
    pub style: FlatStyle,
    pub on_appear: Option<ActionRef>,
    pub on_disappear: Option<ActionRef>,
}

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RenderNodeKind {
    Container(ContainerNode),
    SectionLayout(SectionLayoutNode),
    Section(SectionNode),
    Text(TextNode),
    Button(ButtonNode),
    Image(ImageNode),
    Toggle(ToggleNode),
    Slider(SliderNode),
    TextField(TextFieldNode),
    Shape(ShapeNode),
    Gradient(GradientNode),
    Divider(DividerNode),
    Spacer(SpacerNode),
    /// Produced by host-registered component resolvers.
    Custom(CustomNode),
    /// A component type no resolver is registered for.
    Unknown { component_type: String },
}

impl RenderNodeKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Container(_) => "container",
            Self::SectionLayout(_) => "sectionLayout",
            Self::Section(_) => "section",
            Self::Text(_) => "text",
            Self::Button(_) => "button",
            Self::Image(_) => "image",
            Self::Toggle(_) => "toggle",
            Self::Slider(_) => "slider",
            Self::TextField(_) => "textfield",
            Self::Shape(_) => "shape",
            Self::Gradient(_) => "gradient",
            Self::Divider(_) => "divider",
            Self::Spacer(_) => "spacer",
            Self::Custom(custom) => &custom.component_type,
            Self::Unknown { component_type } => component_type,
        }
    }

    /// Flattened style, for kinds that carry one.
    pub fn style(&self) -> Option<&FlatStyle> {
        match self {
            Self::Container(node) => Some(&node.style),
            Self::Text(node) => Some(&node.style),
            Self::Button(node) => Some(&node.style),
            Self::Image(node) => Some(&node.style),
            Self::Toggle(node) => Some(&node.style),
            Self::Slider(node) => Some(&node.style),
            Self::TextField(node) => Some(&node.style),
            Self::Shape(node) => Some(&node.style),
            Self::Gradient(node) => Some(&node.style),
            Self::Divider(node) => Some(&node.style),
            Self::Custom(node) => Some(&node.style),
            Self::SectionLayout(_) | Self::Section(_) | Self::Spacer(_) | Self::Unknown { .. } => {
                None
            }
        }
    }

    /// Every bound value of this node, for refreshing.
    pub fn bound_values_mut(&mut self) -> Vec<&mut BoundValue> {
        match self {
            Self::Text(node) => vec![&mut node.content],
            Self::Button(node) => {
                let mut values = vec![&mut node.label];
                values.extend(node.is_selected.as_mut());
                values
            }
            Self::Image(node) => match &mut node.source {
                ImageSource::Url(url) => vec![url],
                ImageSource::Asset(_) | ImageSource::System(_) => Vec::new(),
            },
            Self::Toggle(node) => {
                let mut values = vec![&mut node.is_on];
                values.extend(node.label.as_mut());
                values
            }
            Self::Slider(node) => vec![&mut node.value],
            Self::TextField(node) => vec![&mut node.text],
            _ => Vec::new(),
        }
    }

    /// Re-evaluate every bound value. Returns whether anything changed.
    pub fn refresh(&mut self, state: &dyn StateReader) -> bool {
        self.bound_values_mut()
            .into_iter()
            .fold(false, |changed, value| value.refresh(state) | changed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerNode {
    pub axis: StackKind,
    pub alignment: Alignment,
    pub style: FlatStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionLayoutNode {
    pub section_spacing: f64,
}

/// Flattened section layout configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionConfig {
    pub kind: SectionKind,
    pub columns: Option<ColumnSpec>,
    pub item_spacing: f64,
    pub line_spacing: f64,
    pub content_insets: EdgeInsets,
    pub alignment: Alignment,
    pub show_indicators: bool,
    pub is_paging_enabled: bool,
    pub snap_behavior: SnapBehavior,
    pub show_dividers: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionNode {
    pub config: SectionConfig,
    pub sticky_header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub content: BoundValue,
    pub style: FlatStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonNode {
    pub label: BoundValue,
    pub style: FlatStyle,
    pub selected_style: Option<FlatStyle>,
    pub disabled_style: Option<FlatStyle>,
    pub is_selected: Option<BoundValue>,
    pub image: Option<ImageSource>,
    pub on_tap: Option<ActionRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Asset(String),
    /// Platform symbol name.
    System(String),
    Url(BoundValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub source: ImageSource,
    pub style: FlatStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleNode {
    pub label: Option<BoundValue>,
    pub is_on: BoundValue,
    /// Two-way binding target.
    pub bind: Option<String>,
    pub style: FlatStyle,
    pub on_value_changed: Option<ActionRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderNode {
    pub value: BoundValue,
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
    pub bind: Option<String>,
    pub style: FlatStyle,
    pub on_value_changed: Option<ActionRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextFieldNode {
    pub text: BoundValue,
    pub placeholder: Option<String>,
    pub is_secure: bool,
    pub bind: Option<String>,
    pub style: FlatStyle,
    pub on_value_changed: Option<ActionRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    RoundedRectangle,
    Circle,
    Capsule,
    Ellipse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    pub shape: ShapeKind,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub style: FlatStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub color: String,
    pub location: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientNode {
    pub gradient: GradientKind,
    pub stops: Vec<GradientStop>,
    pub start_point: String,
    pub end_point: String,
    pub style: FlatStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DividerNode {
    pub thickness: f64,
    pub color: Option<String>,
    pub style: FlatStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpacerNode {
    pub min_length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomNode {
    pub component_type: String,
    pub properties: BTreeMap<String, StateValue>,
    pub style: FlatStyle,
}
