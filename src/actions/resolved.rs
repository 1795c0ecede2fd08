//! ResolvedAction: the IR form of an action and its typed parameter access.
//!
//! Parameters form an open map so execution layers can read custom kinds
//! without the core knowing their shape. Typed reads go through
//! [`FromParameter`] and fail with a [`ParameterError`] naming the key.

use std::collections::BTreeMap;

use crate::document::action::ActionKind;
use crate::document::value::StateValue;

/// A resolved parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionParameter {
    Literal(StateValue),
    /// Evaluated at execution time against the then-current state.
    Expression(String),
    /// Nested actions, e.g. the steps of a sequence.
    Actions(Vec<ResolvedAction>),
}

impl ActionParameter {
    /// Short description of what this parameter holds, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Literal(value) => value.kind().to_string(),
            Self::Expression(_) => "expression".to_owned(),
            Self::Actions(_) => "actions".to_owned(),
        }
    }
}

impl From<StateValue> for ActionParameter {
    fn from(value: StateValue) -> Self {
        Self::Literal(value)
    }
}

/// Typed parameter read failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("missing required parameter {0:?}")]
    Missing(String),
    #[error("parameter {key:?} should be {expected}, got {found}")]
    WrongKind {
        key: String,
        expected: &'static str,
        found: String,
    },
}

/// Conversion from a parameter into a typed value.
pub trait FromParameter: Sized {
    /// Name of the expected kind, reported in [`ParameterError::WrongKind`].
    const EXPECTED: &'static str;

    fn from_parameter(parameter: &ActionParameter) -> Option<Self>;
}

fn literal(parameter: &ActionParameter) -> Option<&StateValue> {
    match parameter {
        ActionParameter::Literal(value) => Some(value),
        _ => None,
    }
}

impl FromParameter for String {
    const EXPECTED: &'static str = "string";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        literal(parameter)?.as_str().map(str::to_owned)
    }
}

impl FromParameter for i64 {
    const EXPECTED: &'static str = "int";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        match literal(parameter)? {
            StateValue::Int(n) => Some(*n),
            StateValue::Double(d) if d.fract() == 0.0 => Some(*d as i64),
            _ => None,
        }
    }
}

impl FromParameter for f64 {
    const EXPECTED: &'static str = "number";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        literal(parameter)?.as_f64()
    }
}

impl FromParameter for bool {
    const EXPECTED: &'static str = "bool";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        literal(parameter)?.as_bool()
    }
}

impl FromParameter for StateValue {
    const EXPECTED: &'static str = "literal";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        literal(parameter).cloned()
    }
}

impl FromParameter for Vec<StateValue> {
    const EXPECTED: &'static str = "array";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        literal(parameter)?.as_array().map(<[_]>::to_vec)
    }
}

impl FromParameter for BTreeMap<String, StateValue> {
    const EXPECTED: &'static str = "object";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        literal(parameter)?.as_object().cloned()
    }
}

impl FromParameter for Vec<ResolvedAction> {
    const EXPECTED: &'static str = "actions";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        match parameter {
            ActionParameter::Actions(actions) => Some(actions.clone()),
            _ => None,
        }
    }
}

impl FromParameter for ActionParameter {
    const EXPECTED: &'static str = "parameter";
    fn from_parameter(parameter: &ActionParameter) -> Option<Self> {
        Some(parameter.clone())
    }
}

/// An action ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAction {
    pub kind: ActionKind,
    pub parameters: BTreeMap<String, ActionParameter>,
}

impl ResolvedAction {
    pub fn new(kind: impl Into<ActionKind>) -> Self {
        Self {
            kind: kind.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// The action that does nothing.
    pub fn noop() -> Self {
        Self::new(ActionKind::NoOp)
    }

    pub fn is_noop(&self) -> bool {
        self.kind == ActionKind::NoOp
    }

    /// Add a parameter (builder).
    pub fn with_parameter(mut self, key: impl Into<String>, parameter: ActionParameter) -> Self {
        self.parameters.insert(key.into(), parameter);
        self
    }

    /// Add a literal parameter (builder).
    pub fn with_literal(self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.with_parameter(key, ActionParameter::Literal(value.into()))
    }

    /// Typed read. `None` when the key is absent or holds another kind.
    pub fn parameter<T: FromParameter>(&self, key: &str) -> Option<T> {
        self.parameters.get(key).and_then(T::from_parameter)
    }

    /// Typed read that reports why it failed.
    pub fn required_parameter<T: FromParameter>(&self, key: &str) -> Result<T, ParameterError> {
        let parameter = self
            .parameters
            .get(key)
            .ok_or_else(|| ParameterError::Missing(key.to_owned()))?;
        T::from_parameter(parameter).ok_or_else(|| ParameterError::WrongKind {
            key: key.to_owned(),
            expected: T::EXPECTED,
            found: parameter.describe(),
        })
    }

    /// The stored expression for `key`, if it is deferred.
    pub fn expression(&self, key: &str) -> Option<&str> {
        match self.parameters.get(key)? {
            ActionParameter::Expression(expr) => Some(expr),
            _ => None,
        }
    }
}
