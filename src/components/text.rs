//! `text` and `button`.

use serde::Deserialize;

use crate::document::node::Component;
use crate::ir::{ButtonNode, RenderNodeKind, TextNode};
use crate::resolve::{ResolutionContext, ResolutionError};
use crate::style::NodeOverrides;

use super::media::image_source;

pub fn text(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    Ok(RenderNodeKind::Text(TextNode {
        content: ctx.content(component),
        style: ctx.flat_style(component),
    }))
}

/// Per-state style ids of a button: `"styles": {"normal": ..., "selected": ..., "disabled": ...}`.
#[derive(Debug, Default, Deserialize)]
struct ButtonStyles {
    normal: Option<String>,
    selected: Option<String>,
    disabled: Option<String>,
}

/// A button. `normal` replaces `styleId` when both are set; the selected
/// and disabled styles get the same inline overrides as the normal one.
/// `isSelected` is a state path or helper expression.
pub fn button(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let styles: ButtonStyles = component.property("styles").unwrap_or_default();
    let overrides = NodeOverrides {
        padding: component.padding.as_ref(),
        width: component.width,
        height: component.height,
        spacing: None,
    };
    let inline = component.style.as_ref();

    let normal_id = styles.normal.as_deref().or(component.style_id.as_deref());
    let style = ctx.flat_style_with(normal_id, inline, overrides);
    let selected_style = styles
        .selected
        .as_deref()
        .map(|id| ctx.flat_style_with(Some(id), inline, overrides));
    let disabled_style = styles
        .disabled
        .as_deref()
        .map(|id| ctx.flat_style_with(Some(id), inline, overrides));

    let is_selected = component
        .property::<String>("isSelected")
        .map(|path| ctx.bind_path(&path));

    Ok(RenderNodeKind::Button(ButtonNode {
        label: ctx.content(component),
        style,
        selected_style,
        disabled_style,
        is_selected,
        image: image_source(component, ctx),
        on_tap: ctx.optional_action(component.actions.on_tap.as_ref()),
    }))
}
