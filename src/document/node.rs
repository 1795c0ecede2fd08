//! Layout nodes: containers, section layouts, list iteration, spacers and
//! leaf components.
//!
//! Nodes are discriminated by their `type` key. The container, section,
//! forEach and spacer tags are fixed; every other tag is a leaf component and
//! is kept verbatim so the component registry can dispatch on it.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use super::action::ComponentActions;
use super::data::DataReference;
use crate::style::properties::{Padding, StyleProperties};

// ---------------------------------------------------------------------------
// Shared enums
// ---------------------------------------------------------------------------

/// Stack axis of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackKind {
    #[default]
    #[serde(rename = "vstack")]
    Vertical,
    #[serde(rename = "hstack")]
    Horizontal,
    #[serde(rename = "zstack")]
    Overlay,
}

/// Alignment of children inside a container or section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    Leading,
    #[default]
    Center,
    Trailing,
    Top,
    Bottom,
    TopLeading,
    TopTrailing,
    BottomLeading,
    BottomTrailing,
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A node of the authored layout tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Container(ContainerNode),
    SectionLayout(SectionLayoutNode),
    ForEach(ForEachNode),
    Spacer(SpacerNode),
    Component(Component),
}

impl Node {
    /// The `type` tag this node was authored with.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Container(c) => match c.kind {
                StackKind::Vertical => "vstack",
                StackKind::Horizontal => "hstack",
                StackKind::Overlay => "zstack",
            },
            Self::SectionLayout(_) => "sectionLayout",
            Self::ForEach(_) => "forEach",
            Self::Spacer(_) => "spacer",
            Self::Component(c) => &c.component_type,
        }
    }
}

fn from_json<T: DeserializeOwned, E: serde::de::Error>(value: serde_json::Value) -> Result<T, E> {
    serde_json::from_value(value).map_err(E::custom)
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_owned();

        match tag.as_str() {
            "vstack" | "hstack" | "zstack" => from_json(value).map(Node::Container),
            "sectionLayout" => from_json(value).map(Node::SectionLayout),
            "forEach" => from_json(value).map(Node::ForEach),
            "spacer" => from_json(value).map(Node::Spacer),
            _ => from_json(value).map(Node::Component),
        }
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// A vertical, horizontal or overlay stack.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerNode {
    #[serde(rename = "type")]
    pub kind: StackKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub style_id: Option<String>,
    #[serde(default)]
    pub style: Option<StyleProperties>,
    #[serde(default)]
    pub padding: Option<Padding>,
    #[serde(default)]
    pub alignment: Option<Alignment>,
    #[serde(default)]
    pub spacing: Option<f64>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Flexible space inside a stack.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacerNode {
    #[serde(default)]
    pub min_length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

// ---------------------------------------------------------------------------
// ForEach
// ---------------------------------------------------------------------------

fn default_item_variable() -> String {
    "item".to_owned()
}

fn default_index_variable() -> String {
    "index".to_owned()
}

/// Resolves `template` once per element of the array at `items`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForEachNode {
    #[serde(default)]
    pub id: Option<String>,
    /// State path of the source array.
    pub items: String,
    #[serde(default = "default_item_variable")]
    pub item_variable: String,
    #[serde(default = "default_index_variable")]
    pub index_variable: String,
    pub template: Box<Node>,
    #[serde(default)]
    pub empty_view: Option<Box<Node>>,
    /// Stack the expanded items are laid out in.
    #[serde(default)]
    pub layout: StackKind,
    #[serde(default)]
    pub spacing: Option<f64>,
    #[serde(default)]
    pub alignment: Option<Alignment>,
    #[serde(default)]
    pub padding: Option<Padding>,
}

// ---------------------------------------------------------------------------
// Section layouts
// ---------------------------------------------------------------------------

/// How a section arranges its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    /// Horizontally scrolling rail.
    Horizontal,
    #[default]
    List,
    Grid,
    /// Wrapping flow.
    Flow,
}

/// Grid column specification: a fixed count, or as many as fit a minimum width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    Fixed(u32),
    Adaptive {
        #[serde(rename = "minWidth")]
        min_width: f64,
    },
}

/// Scroll snapping for horizontal rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapBehavior {
    #[default]
    None,
    ViewAligned,
    Paging,
}

/// Authored layout settings for one section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionLayoutConfig {
    #[serde(rename = "type", default)]
    pub kind: SectionKind,
    #[serde(default)]
    pub columns: Option<ColumnSpec>,
    #[serde(default)]
    pub item_spacing: Option<f64>,
    #[serde(default)]
    pub line_spacing: Option<f64>,
    #[serde(default)]
    pub content_insets: Option<Padding>,
    #[serde(default)]
    pub alignment: Option<Alignment>,
    #[serde(default)]
    pub show_indicators: bool,
    #[serde(default)]
    pub is_paging_enabled: bool,
    #[serde(default)]
    pub snap_behavior: SnapBehavior,
    #[serde(default)]
    pub show_dividers: bool,
}

/// One section of a section layout.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDefinition {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub layout: SectionLayoutConfig,
    #[serde(default)]
    pub header: Option<Box<Node>>,
    #[serde(default)]
    pub footer: Option<Box<Node>>,
    #[serde(default)]
    pub sticky_header: bool,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A heterogeneous list made of sections.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionLayoutNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub section_spacing: Option<f64>,
    #[serde(default)]
    pub sections: Vec<SectionDefinition>,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A leaf component. `component_type` selects the registered resolver.
///
/// Keys not covered by the common fields land in `properties` and are read by
/// the resolver for that type.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub style_id: Option<String>,
    #[serde(default)]
    pub style: Option<StyleProperties>,
    #[serde(default)]
    pub padding: Option<Padding>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub data: Option<DataReference>,
    /// Two-way bound state path (toggles, sliders, text fields).
    #[serde(default)]
    pub bind: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub actions: ComponentActions,
    #[serde(flatten)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Component {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            ..Self::default()
        }
    }

    /// Read a type-specific property. Missing or mistyped values yield `None`.
    pub fn property<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.properties
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Set a type-specific property (builder).
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}
