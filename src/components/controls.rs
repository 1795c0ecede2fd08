//! Input controls: `toggle`, `slider` and `textfield`.
//!
//! A control's value comes from `bind` when set (a two-way binding the host
//! writes back to), otherwise from `data`, otherwise from a literal property.

use crate::document::node::Component;
use crate::document::value::StateValue;
use crate::ir::{BoundValue, RenderNodeKind, SliderNode, TextFieldNode, ToggleNode};
use crate::resolve::{ResolutionContext, ResolutionError};

/// The control's value and, for `bind`, the store path to write back to.
fn bound_input(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
    fallback: impl FnOnce() -> StateValue,
) -> (BoundValue, Option<String>) {
    if let Some(bind) = &component.bind {
        let value = ctx.bind_path(bind);
        let target = value.binding_path().map(str::to_owned);
        if target.is_none() {
            tracing::debug!(bind = %bind, "bind target has no store location");
        }
        return (value, target);
    }
    match &component.data {
        Some(data) => (ctx.data(data), None),
        None => (BoundValue::Literal(fallback()), None),
    }
}

pub fn toggle(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let initial = component.property::<bool>("isOn").unwrap_or(false);
    let (is_on, bind) = bound_input(component, ctx, || StateValue::Bool(initial));
    let label = component
        .label
        .as_deref()
        .or(component.text.as_deref())
        .map(|label| ctx.bound_text(label));
    Ok(RenderNodeKind::Toggle(ToggleNode {
        label,
        is_on,
        bind,
        style: ctx.flat_style(component),
        on_value_changed: ctx.optional_action(component.actions.on_value_changed.as_ref()),
    }))
}

/// `minValue`/`maxValue` default to 0 and 1; `step` is optional.
pub fn slider(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let min = component.property::<f64>("minValue").unwrap_or(0.0);
    let max = component.property::<f64>("maxValue").unwrap_or(1.0);
    if min > max {
        return Err(ResolutionError::invalid_component(
            "slider",
            format!("minValue {min} is above maxValue {max}"),
        ));
    }
    let step = component.property::<f64>("step").filter(|step| *step > 0.0);
    let (value, bind) = bound_input(component, ctx, || StateValue::Double(min));
    Ok(RenderNodeKind::Slider(SliderNode {
        value,
        min,
        max,
        step,
        bind,
        style: ctx.flat_style(component),
        on_value_changed: ctx.optional_action(component.actions.on_value_changed.as_ref()),
    }))
}

pub fn text_field(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let initial = component.text.clone().unwrap_or_default();
    let (text, bind) = bound_input(component, ctx, || StateValue::String(initial));
    Ok(RenderNodeKind::TextField(TextFieldNode {
        text,
        placeholder: component.placeholder.clone(),
        is_secure: component.property("isSecure").unwrap_or(false),
        bind,
        style: ctx.flat_style(component),
        on_value_changed: ctx.optional_action(component.actions.on_value_changed.as_ref()),
    }))
}
