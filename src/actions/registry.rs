//! Action resolver registry.
//!
//! [`ActionResolverRegistry`] maps action kind names to [`ActionResolver`]s.
//! The `with_defaults()` constructor installs the built-in kinds. A kind with
//! no resolver is passed through with its raw parameters, so actions meant
//! for a handler registered only at execution time still reach it.

use std::collections::{BTreeMap, HashMap};

use crate::document::action::{Action, ParameterValue};

use super::builtin;
use super::resolved::{ActionParameter, ResolvedAction};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to resolve one action of a known kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionResolutionError {
    #[error("{kind} action is missing required parameter {key:?}")]
    MissingParameter { kind: String, key: String },
    #[error("{kind} action parameter {key:?} should be {expected}, got {found}")]
    WrongType {
        kind: String,
        key: String,
        expected: &'static str,
        found: String,
    },
    #[error("action nesting exceeds {limit} levels")]
    DepthExceeded { limit: usize },
}

// ---------------------------------------------------------------------------
// ActionResolver
// ---------------------------------------------------------------------------

/// Resolves one action kind.
pub trait ActionResolver {
    fn resolve(
        &self,
        action: &Action,
        ctx: &mut ActionContext<'_>,
    ) -> Result<ResolvedAction, ActionResolutionError>;
}

impl<F> ActionResolver for F
where
    F: Fn(&Action, &mut ActionContext<'_>) -> Result<ResolvedAction, ActionResolutionError>,
{
    fn resolve(
        &self,
        action: &Action,
        ctx: &mut ActionContext<'_>,
    ) -> Result<ResolvedAction, ActionResolutionError> {
        self(action, ctx)
    }
}

// ---------------------------------------------------------------------------
// ActionContext
// ---------------------------------------------------------------------------

/// State threaded through nested action resolution.
pub struct ActionContext<'a> {
    registry: &'a ActionResolverRegistry,
    actions: &'a BTreeMap<String, Action>,
    depth: usize,
    max_depth: usize,
}

impl<'a> ActionContext<'a> {
    pub const DEFAULT_MAX_DEPTH: usize = 16;

    pub fn new(registry: &'a ActionResolverRegistry, actions: &'a BTreeMap<String, Action>) -> Self {
        Self {
            registry,
            actions,
            depth: 0,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit nesting of sequences and references (builder).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Look an action up in the document's action table.
    pub fn lookup(&self, id: &str) -> Option<&'a Action> {
        self.actions.get(id)
    }

    /// Resolve a nested action through the registry.
    pub fn resolve(&mut self, action: &Action) -> Result<ResolvedAction, ActionResolutionError> {
        if self.depth >= self.max_depth {
            return Err(ActionResolutionError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let registry = self.registry;
        let result = registry.dispatch(action, self);
        self.depth -= 1;
        result
    }

    /// Resolve an action by id. Unknown ids resolve to a no-op.
    pub fn resolve_reference(&mut self, id: &str) -> Result<ResolvedAction, ActionResolutionError> {
        match self.lookup(id) {
            Some(action) => self.resolve(action),
            None => {
                tracing::warn!(action = id, "unknown action reference, using no-op");
                Ok(ResolvedAction::noop())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ActionResolverRegistry
// ---------------------------------------------------------------------------

/// Registry of action resolvers keyed by kind name.
#[derive(Default)]
pub struct ActionResolverRegistry {
    resolvers: HashMap<String, Box<dyn ActionResolver>>,
}

impl std::fmt::Debug for ActionResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("ActionResolverRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl ActionResolverRegistry {
    /// Create an empty registry. Every kind passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in kinds: `dismiss`, `setState`,
    /// `toggleState`, `showAlert`, `sequence`, `navigate` and `noop`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        builtin::register_defaults(&mut registry);
        registry
    }

    /// Register a resolver, replacing any previous one for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, resolver: impl ActionResolver + 'static) {
        self.resolvers.insert(kind.into(), Box::new(resolver));
    }

    /// Remove the resolver for `kind`. Returns whether one was registered.
    pub fn unregister(&mut self, kind: &str) -> bool {
        self.resolvers.remove(kind).is_some()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.resolvers.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolve one action against `actions` (used for references inside it).
    pub fn resolve(
        &self,
        action: &Action,
        actions: &BTreeMap<String, Action>,
    ) -> Result<ResolvedAction, ActionResolutionError> {
        ActionContext::new(self, actions).resolve(action)
    }

    /// Resolve a whole action table. An action that fails is replaced by a
    /// no-op so references to it stay valid; the failures are returned
    /// alongside.
    pub fn resolve_all(
        &self,
        actions: &BTreeMap<String, Action>,
        max_depth: usize,
    ) -> (
        BTreeMap<String, ResolvedAction>,
        Vec<(String, ActionResolutionError)>,
    ) {
        let mut resolved = BTreeMap::new();
        let mut failures = Vec::new();
        for (id, action) in actions {
            let mut ctx = ActionContext::new(self, actions).with_max_depth(max_depth);
            match ctx.resolve(action) {
                Ok(action) => {
                    resolved.insert(id.clone(), action);
                }
                Err(err) => {
                    tracing::warn!(action = %id, error = %err, "action failed to resolve");
                    resolved.insert(id.clone(), ResolvedAction::noop());
                    failures.push((id.clone(), err));
                }
            }
        }
        (resolved, failures)
    }

    fn dispatch(
        &self,
        action: &Action,
        ctx: &mut ActionContext<'_>,
    ) -> Result<ResolvedAction, ActionResolutionError> {
        match self.resolvers.get(action.kind.as_str()) {
            Some(resolver) => resolver.resolve(action, ctx),
            None => {
                tracing::debug!(kind = %action.kind, "passing through unregistered action kind");
                Ok(pass_through(action))
            }
        }
    }
}

/// Carry every authored parameter over unchanged.
pub fn pass_through(action: &Action) -> ResolvedAction {
    ResolvedAction {
        kind: action.kind.clone(),
        parameters: action
            .parameters
            .iter()
            .map(|(key, value)| (key.clone(), ActionParameter::from(value)))
            .collect(),
    }
}

impl From<&ParameterValue> for ActionParameter {
    fn from(value: &ParameterValue) -> Self {
        match value {
            ParameterValue::Literal(value) => ActionParameter::Literal(value.clone()),
            ParameterValue::Expression(expr) => ActionParameter::Expression(expr.clone()),
        }
    }
}
