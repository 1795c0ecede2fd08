//! Flattening a resolved style into the concrete values the IR carries.
//!
//! Node-level fields override the resolved style field by field; fields the
//! node leaves unset fall back to the style, and padding edges set by neither
//! are zero. Every node kind flattens through [`FlatStyle::flatten`].

use serde::Serialize;

use crate::style::properties::{FontWeight, Padding, Shadow, StyleProperties, TextAlignment};

/// Concrete padding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeInsets {
    pub top: f64,
    pub bottom: f64,
    pub leading: f64,
    pub trailing: f64,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        bottom: 0.0,
        leading: 0.0,
        trailing: 0.0,
    };

    /// Per edge: the node's value, else the style's, else zero.
    pub fn resolve(node: Option<&Padding>, style: Option<&Padding>) -> EdgeInsets {
        let edge = |pick: fn(&Padding) -> Option<f64>| {
            node.and_then(pick)
                .or_else(|| style.and_then(pick))
                .unwrap_or(0.0)
        };
        EdgeInsets {
            top: edge(Padding::top_value),
            bottom: edge(Padding::bottom_value),
            leading: edge(Padding::leading_value),
            trailing: edge(Padding::trailing_value),
        }
    }
}

/// A shadow with every sub-field filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatShadow {
    pub color: String,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
}

impl From<&Shadow> for FlatShadow {
    fn from(shadow: &Shadow) -> Self {
        FlatShadow {
            color: shadow.color.clone().unwrap_or_else(|| "#000000".to_owned()),
            radius: shadow.radius.unwrap_or(0.0),
            x: shadow.x.unwrap_or(0.0),
            y: shadow.y.unwrap_or(0.0),
        }
    }
}

/// Fields a node may set directly, outside of any style.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeOverrides<'a> {
    pub padding: Option<&'a Padding>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub spacing: Option<f64>,
}

/// Style as the renderer sees it: no references, no inheritance.
///
/// Fields that stay `Option` have no neutral value; renderers apply their own
/// platform default when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub tint_color: Option<String>,
    pub opacity: f64,
    pub text_alignment: Option<TextAlignment>,
    pub corner_radius: f64,
    pub border_width: f64,
    pub border_color: Option<String>,
    pub spacing: Option<f64>,
    pub padding: EdgeInsets,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    pub shadow: Option<FlatShadow>,
}

impl Default for FlatStyle {
    fn default() -> Self {
        FlatStyle::flatten(&StyleProperties::default(), NodeOverrides::default())
    }
}

impl FlatStyle {
    pub fn flatten(style: &StyleProperties, node: NodeOverrides<'_>) -> FlatStyle {
        FlatStyle {
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            font_weight: style.font_weight,
            text_color: style.text_color.clone(),
            background_color: style.background_color.clone(),
            tint_color: style.tint_color.clone(),
            opacity: style.opacity.unwrap_or(1.0),
            text_alignment: style.text_alignment,
            corner_radius: style.corner_radius.unwrap_or(0.0),
            border_width: style.border_width.unwrap_or(0.0),
            border_color: style.border_color.clone(),
            spacing: node.spacing.or(style.spacing),
            padding: EdgeInsets::resolve(node.padding, style.padding.as_ref()),
            width: node.width.or(style.width),
            height: node.height.or(style.height),
            min_width: style.min_width,
            min_height: style.min_height,
            max_width: style.max_width,
            max_height: style.max_height,
            shadow: style.shadow.as_ref().map(FlatShadow::from),
        }
    }
}
