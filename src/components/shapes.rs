//! `shape` and `divider`.

use crate::document::node::Component;
use crate::ir::{DividerNode, RenderNodeKind, ShapeKind, ShapeNode};
use crate::resolve::{ResolutionContext, ResolutionError};

fn shape_kind(name: &str) -> Option<ShapeKind> {
    Some(match name {
        "rectangle" => ShapeKind::Rectangle,
        "roundedRectangle" => ShapeKind::RoundedRectangle,
        "circle" => ShapeKind::Circle,
        "capsule" => ShapeKind::Capsule,
        "ellipse" => ShapeKind::Ellipse,
        _ => return None,
    })
}

/// `shapeType` defaults to a rectangle. Fill and stroke fall back to the
/// style's background and border.
pub fn shape(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let shape = match component.property::<String>("shapeType") {
        Some(name) => shape_kind(&name).ok_or_else(|| {
            ResolutionError::invalid_component("shape", format!("unknown shape {name:?}"))
        })?,
        None => ShapeKind::Rectangle,
    };
    let style = ctx.flat_style(component);
    Ok(RenderNodeKind::Shape(ShapeNode {
        shape,
        fill: component
            .property("fillColor")
            .or_else(|| style.background_color.clone()),
        stroke: component
            .property("strokeColor")
            .or_else(|| style.border_color.clone()),
        stroke_width: component
            .property("strokeWidth")
            .unwrap_or(style.border_width),
        style,
    }))
}

pub fn divider(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let style = ctx.flat_style(component);
    Ok(RenderNodeKind::Divider(DividerNode {
        thickness: component.property("thickness").unwrap_or(1.0),
        color: component
            .property("color")
            .or_else(|| style.border_color.clone()),
        style,
    }))
}
