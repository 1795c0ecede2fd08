//! Component resolver registry.
//!
//! [`ComponentResolverRegistry`] maps component type names to
//! [`ComponentResolver`]s. `with_defaults()` installs the built-in types; a
//! host adds its own with [`register`](ComponentResolverRegistry::register).
//! A type with no resolver becomes an [`Unknown`](RenderNodeKind::Unknown)
//! leaf so the rest of the document still renders.

use std::collections::{BTreeMap, HashMap};

use crate::document::node::Component;
use crate::document::value::StateValue;
use crate::ir::{CustomNode, RenderNodeKind};
use crate::resolve::{ResolutionContext, ResolutionError};

use super::{controls, media, shapes, text};

/// Resolves one component type into an IR node kind.
pub trait ComponentResolver {
    fn resolve(
        &self,
        component: &Component,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<RenderNodeKind, ResolutionError>;
}

impl<F> ComponentResolver for F
where
    F: Fn(&Component, &mut ResolutionContext<'_>) -> Result<RenderNodeKind, ResolutionError>,
{
    fn resolve(
        &self,
        component: &Component,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<RenderNodeKind, ResolutionError> {
        self(component, ctx)
    }
}

/// Registry of component resolvers keyed by type name.
#[derive(Default)]
pub struct ComponentResolverRegistry {
    resolvers: HashMap<String, Box<dyn ComponentResolver>>,
}

impl std::fmt::Debug for ComponentResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("ComponentResolverRegistry")
            .field("types", &types)
            .finish()
    }
}

impl ComponentResolverRegistry {
    /// Create an empty registry. Every component resolves to `Unknown`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in types: `text`, `button`, `image`,
    /// `toggle`, `slider`, `textfield`, `shape`, `gradient` and `divider`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("text", text::text);
        registry.register("button", text::button);
        registry.register("image", media::image);
        registry.register("gradient", media::gradient);
        registry.register("toggle", controls::toggle);
        registry.register("slider", controls::slider);
        registry.register("textfield", controls::text_field);
        registry.register("shape", shapes::shape);
        registry.register("divider", shapes::divider);
        registry
    }

    /// Register a resolver, replacing any previous one for `component_type`.
    pub fn register(
        &mut self,
        component_type: impl Into<String>,
        resolver: impl ComponentResolver + 'static,
    ) {
        self.resolvers
            .insert(component_type.into(), Box::new(resolver));
    }

    pub fn unregister(&mut self, component_type: &str) -> bool {
        self.resolvers.remove(component_type).is_some()
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.resolvers.contains_key(component_type)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolve `component` with the resolver registered for its type.
    pub fn resolve(
        &self,
        component: &Component,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<RenderNodeKind, ResolutionError> {
        match self.resolvers.get(&component.component_type) {
            Some(resolver) => resolver.resolve(component, ctx),
            None => {
                tracing::debug!(component_type = %component.component_type, "no resolver registered");
                Ok(RenderNodeKind::Unknown {
                    component_type: component.component_type.clone(),
                })
            }
        }
    }
}

/// A [`CustomNode`] carrying the component's extra properties. String
/// properties are interpolated against the current scope and state.
///
/// Host resolvers can return this directly or start from it.
pub fn custom_node(
    component: &Component,
    ctx: &mut ResolutionContext<'_>,
) -> Result<RenderNodeKind, ResolutionError> {
    let properties: BTreeMap<String, StateValue> = component
        .properties
        .iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(text) if text.contains("${") => {
                    StateValue::String(ctx.interpolate(text))
                }
                other => StateValue::from(other.clone()),
            };
            (key.clone(), value)
        })
        .collect();
    Ok(RenderNodeKind::Custom(CustomNode {
        component_type: component.component_type.clone(),
        properties,
        style: ctx.flat_style(component),
    }))
}
