//! Values that may be bound to live state, and references to actions.

use crate::actions::ResolvedAction;
use crate::document::value::StateValue;
use crate::expr::{evaluate, ExpressionEvaluator, Scope, ScopedReader, StateReader};

/// A node field resolved either to a literal or to a live binding.
///
/// Bindings keep the store path or template they came from along with the
/// value current at resolution time, so a renderer can re-evaluate them when
/// the state changes without re-resolving the document.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Literal(StateValue),
    Binding {
        /// Store path (iteration variables already mapped to their source).
        path: String,
        current: StateValue,
    },
    Template {
        template: String,
        current: String,
        /// Iteration variables visible where the template was resolved.
        scope: Scope,
    },
}

impl BoundValue {
    pub fn literal(value: impl Into<StateValue>) -> Self {
        Self::Literal(value.into())
    }

    /// The value to display now.
    pub fn current(&self) -> StateValue {
        match self {
            Self::Literal(value) | Self::Binding { current: value, .. } => value.clone(),
            Self::Template { current, .. } => StateValue::String(current.clone()),
        }
    }

    /// The current value rendered as text.
    pub fn text(&self) -> String {
        match self {
            Self::Literal(value) | Self::Binding { current: value, .. } => value.stringify(),
            Self::Template { current, .. } => current.clone(),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Self::Literal(value) | Self::Binding { current: value, .. } => {
                value.as_bool().unwrap_or(false)
            }
            Self::Template { current, .. } => current == "true",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Literal(value) | Self::Binding { current: value, .. } => value.as_f64(),
            Self::Template { current, .. } => current.trim().parse().ok(),
        }
    }

    /// The store path this value reads, for bindings.
    pub fn binding_path(&self) -> Option<&str> {
        match self {
            Self::Binding { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }

    /// Re-evaluate against `state`. Returns whether the current value changed.
    pub fn refresh(&mut self, state: &dyn StateReader) -> bool {
        match self {
            Self::Literal(_) => false,
            Self::Binding { path, current } => {
                let next = read_binding(path, state);
                let changed = *current != next;
                *current = next;
                changed
            }
            Self::Template {
                template,
                current,
                scope,
            } => {
                let scope = scope.refreshed(state);
                let reader = ScopedReader::new(&scope, state);
                let next = ExpressionEvaluator::new(&reader).interpolate(template);
                let changed = *current != next;
                *current = next;
                changed
            }
        }
    }
}

/// Read a binding path. Plain paths read the store directly and are null
/// when absent; helper forms such as `items.count` go through the evaluator.
pub fn read_binding(path: &str, state: &dyn StateReader) -> StateValue {
    if let Some(value) = state.read(path) {
        return value;
    }
    match evaluate(path, state) {
        StateValue::String(text) if text == path.trim() => StateValue::Null,
        other => other,
    }
}

/// How a node refers to an action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRef {
    /// Key into [`RenderTree::actions`](crate::ir::RenderTree::actions).
    Named(String),
    Inline(ResolvedAction),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ScopeEntry;
    use crate::state::{StatePath, StateStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn binding_refresh_tracks_the_store() {
        let mut store = StateStore::new();
        store.set("count", 1).unwrap();
        let mut value = BoundValue::Binding {
            path: "count".into(),
            current: StateValue::Int(1),
        };
        assert!(!value.refresh(&store));
        store.set("count", 2).unwrap();
        assert!(value.refresh(&store));
        assert_eq!(value.current(), StateValue::Int(2));
    }

    #[test]
    fn absent_binding_is_null() {
        let store = StateStore::new();
        assert_eq!(read_binding("missing.path", &store), StateValue::Null);
        assert_eq!(read_binding("items.count", &store), StateValue::Int(0));
    }

    #[test]
    fn template_refresh_rereads_iteration_sources() {
        let mut store = StateStore::new();
        store
            .set("items", vec![StateValue::from("a"), StateValue::from("b")])
            .unwrap();
        let mut scope = Scope::new();
        scope.push([(
            "item".to_owned(),
            ScopeEntry::new(
                StateValue::from("b"),
                Some(StatePath::parse("items[1]").unwrap()),
            ),
        )]);
        let mut value = BoundValue::Template {
            template: "Item: ${item}".into(),
            current: "Item: b".into(),
            scope,
        };

        store.set("items[1]", "z").unwrap();
        assert!(value.refresh(&store));
        assert_eq!(value.text(), "Item: z");
    }
}
