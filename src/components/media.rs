//! `image` and `gradient`.

use serde::Deserialize;

use crate::document::node::Component;
use crate::ir::{GradientKind, GradientNode, GradientStop, ImageNode, ImageSource, RenderNodeKind};
use crate::resolve::{ResolutionContext, ResolutionError};

/// Authored image source: `{"type": "asset" | "system", "name": ...}` or
/// `{"type": "url", "url": ...}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ImageSpec {
    Asset { name: String },
    System { name: String },
    Url { url: String },
}

/// The `image` property of a component, if it has a usable one. URLs may
/// hold `${...}` placeholders.
pub(crate) fn image_source(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Option<ImageSource> {
    let spec = component.property::<ImageSpec>("image")?;
    Some(match spec {
        ImageSpec::Asset { name } => ImageSource::Asset(name),
        ImageSpec::System { name } => ImageSource::System(name),
        ImageSpec::Url { url } => ImageSource::Url(ctx.bound_text(&url)),
    })
}

/// An image from its `image` property, or a URL from `data`.
pub fn image(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let source = match image_source(component, ctx) {
        Some(source) => source,
        None => match &component.data {
            Some(data) => ImageSource::Url(ctx.data(data)),
            None => return Err(ResolutionError::invalid_component("image", "no image source")),
        },
    };
    Ok(RenderNodeKind::Image(ImageNode {
        source,
        style: ctx.flat_style(component),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StopSpec {
    Color(String),
    Stop { color: String, location: Option<f64> },
}

/// A gradient from `colors`: plain color strings or `{color, location}`
/// stops. Stops without a location are spread evenly.
pub fn gradient(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let colors: Vec<StopSpec> = component.property("colors").unwrap_or_default();
    if colors.is_empty() {
        return Err(ResolutionError::invalid_component("gradient", "no colors"));
    }
    let last = (colors.len() - 1).max(1) as f64;
    let stops = colors
        .into_iter()
        .enumerate()
        .map(|(i, spec)| {
            let even = i as f64 / last;
            match spec {
                StopSpec::Color(color) => GradientStop { color, location: even },
                StopSpec::Stop { color, location } => GradientStop {
                    color,
                    location: location.unwrap_or(even).clamp(0.0, 1.0),
                },
            }
        })
        .collect();

    let gradient = match component.property::<String>("gradientType").as_deref() {
        Some("radial") => GradientKind::Radial,
        _ => GradientKind::Linear,
    };
    Ok(RenderNodeKind::Gradient(GradientNode {
        gradient,
        stops,
        start_point: component
            .property("startPoint")
            .unwrap_or_else(|| "top".to_owned()),
        end_point: component
            .property("endPoint")
            .unwrap_or_else(|| "bottom".to_owned()),
        style: ctx.flat_style(component),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionResolverRegistry;
    use crate::config::ResolverConfig;
    use crate::document::data::DataReference;
    use crate::document::Document;
    use crate::state::StateStore;
    use pretty_assertions::assert_eq;

    fn with_context(f: impl FnOnce(&mut ResolutionContext<'_>)) {
        let document = Document::from_json(
            r#"{"id": "m", "state": {"avatar": "https://a/1.png", "id": 9}, "root": {"children": []}}"#,
        )
        .unwrap();
        let state = StateStore::with_values(document.state.clone());
        let actions = ActionResolverRegistry::with_defaults();
        let config = ResolverConfig::new();
        let mut ctx = ResolutionContext::new(&document, &state, &actions, &config);
        f(&mut ctx);
    }

    #[test]
    fn image_sources() {
        with_context(|ctx| {
            let url = Component::new("image")
                .with_property("image", serde_json::json!({"type": "url", "url": "https://x/${id}.png"}));
            let RenderNodeKind::Image(node) = image(&url, ctx).unwrap() else {
                panic!("expected image");
            };
            let ImageSource::Url(value) = node.source else {
                panic!("expected url");
            };
            assert_eq!(value.text(), "https://x/9.png");

            let mut bound = Component::new("image");
            bound.data = Some(DataReference::path("avatar"));
            let RenderNodeKind::Image(node) = image(&bound, ctx).unwrap() else {
                panic!("expected image");
            };
            let ImageSource::Url(value) = node.source else {
                panic!("expected url");
            };
            assert_eq!(value.binding_path(), Some("avatar"));

            assert!(matches!(
                image(&Component::new("image"), ctx),
                Err(ResolutionError::InvalidComponent { .. })
            ));
        });
    }

    #[test]
    fn gradient_stops_spread_evenly() {
        with_context(|ctx| {
            let component = Component::new("gradient")
                .with_property(
                    "colors",
                    serde_json::json!(["#000", {"color": "#777"}, {"color": "#FFF", "location": 0.9}]),
                )
                .with_property("gradientType", serde_json::json!("radial"));
            let RenderNodeKind::Gradient(node) = gradient(&component, ctx).unwrap() else {
                panic!("expected gradient");
            };
            assert_eq!(node.gradient, GradientKind::Radial);
            let locations: Vec<f64> = node.stops.iter().map(|s| s.location).collect();
            assert_eq!(locations, vec![0.0, 0.5, 0.9]);
            assert_eq!(node.start_point, "top");
            assert_eq!(node.end_point, "bottom");
        });
    }

    #[test]
    fn gradient_needs_colors() {
        with_context(|ctx| {
            assert!(gradient(&Component::new("gradient"), ctx).is_err());
        });
    }
}
