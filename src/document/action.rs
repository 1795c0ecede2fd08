//! Action records: a kind tag plus an open parameter map.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::value::StateValue;

/// Key marking an object parameter as a deferred expression: `{"$expr": "count + 1"}`.
pub const EXPRESSION_KEY: &str = "$expr";

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// The kind tag of an action. Built-in kinds get their own variant; anything
/// else is carried verbatim as [`ActionKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Dismiss,
    SetState,
    ToggleState,
    ShowAlert,
    Sequence,
    Navigate,
    /// Does nothing. Stands in for missing or invalid referenced actions.
    NoOp,
    Custom(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dismiss => "dismiss",
            Self::SetState => "setState",
            Self::ToggleState => "toggleState",
            Self::ShowAlert => "showAlert",
            Self::Sequence => "sequence",
            Self::Navigate => "navigate",
            Self::NoOp => "noop",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for ActionKind {
    fn from(value: &str) -> Self {
        match value {
            "dismiss" => Self::Dismiss,
            "setState" => Self::SetState,
            "toggleState" => Self::ToggleState,
            "showAlert" => Self::ShowAlert,
            "sequence" => Self::Sequence,
            "navigate" => Self::Navigate,
            "noop" => Self::NoOp,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

// ---------------------------------------------------------------------------
// ParameterValue
// ---------------------------------------------------------------------------

/// An authored parameter: a literal, or an expression to evaluate later.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Literal(StateValue),
    Expression(String),
}

impl ParameterValue {
    pub fn as_literal(&self) -> Option<&StateValue> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Expression(_) => None,
        }
    }
}

impl From<StateValue> for ParameterValue {
    fn from(value: StateValue) -> Self {
        if let StateValue::Object(map) = &value {
            if map.len() == 1 {
                if let Some(StateValue::String(expr)) = map.get(EXPRESSION_KEY) {
                    return Self::Expression(expr.clone());
                }
            }
        }
        Self::Literal(value)
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(value) => value.serialize(serializer),
            Self::Expression(expr) => {
                let mut map = BTreeMap::new();
                map.insert(EXPRESSION_KEY, expr.as_str());
                map.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParameterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StateValue::deserialize(deserializer).map(Self::from)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// An action as authored: `{"type": "<kind>", ...parameters}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(flatten)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

impl Action {
    pub fn new(kind: impl Into<ActionKind>) -> Self {
        Self {
            kind: kind.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a literal parameter (builder).
    pub fn with_literal(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.parameters
            .insert(key.into(), ParameterValue::Literal(value.into()));
        self
    }

    /// Add an expression parameter (builder).
    pub fn with_expression(mut self, key: impl Into<String>, expr: impl Into<String>) -> Self {
        self.parameters
            .insert(key.into(), ParameterValue::Expression(expr.into()));
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&ParameterValue> {
        self.parameters.get(key)
    }

    /// Parse an action out of a state value (used for nested `steps`).
    pub fn from_state_value(value: &StateValue) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::from(value))
    }
}

// ---------------------------------------------------------------------------
// ActionBinding
// ---------------------------------------------------------------------------

/// How a component refers to an action: by id, or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionBinding {
    Reference(String),
    Inline(Action),
}

/// Event → action bindings on a component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentActions {
    #[serde(default)]
    pub on_tap: Option<ActionBinding>,
    #[serde(default)]
    pub on_value_changed: Option<ActionBinding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_round_trips_through_strings() {
        for name in ["dismiss", "setState", "toggleState", "showAlert", "sequence", "navigate"] {
            assert_eq!(ActionKind::from(name).as_str(), name);
        }
        assert_eq!(
            ActionKind::from("openUrl"),
            ActionKind::Custom("openUrl".into())
        );
    }

    #[test]
    fn parses_literal_and_expression_parameters() {
        let action: Action = serde_json::from_str(
            r#"{"type": "setState", "path": "count", "value": {"$expr": "count + 1"}}"#,
        )
        .unwrap();
        assert_eq!(action.kind, ActionKind::SetState);
        assert_eq!(
            action.parameter("path"),
            Some(&ParameterValue::Literal(StateValue::from("count")))
        );
        assert_eq!(
            action.parameter("value"),
            Some(&ParameterValue::Expression("count + 1".into()))
        );
    }

    #[test]
    fn object_with_extra_keys_is_a_literal() {
        let value: ParameterValue =
            serde_json::from_str(r#"{"$expr": "a", "other": 1}"#).unwrap();
        assert!(matches!(value, ParameterValue::Literal(StateValue::Object(_))));
    }

    #[test]
    fn expression_serializes_back_to_tagged_object() {
        let json = serde_json::to_string(&ParameterValue::Expression("x".into())).unwrap();
        assert_eq!(json, r#"{"$expr":"x"}"#);
    }

    #[test]
    fn binding_reference_or_inline() {
        let bindings: Vec<ActionBinding> =
            serde_json::from_str(r#"["close", {"type": "dismiss"}]"#).unwrap();
        assert_eq!(bindings[0], ActionBinding::Reference("close".into()));
        assert_eq!(bindings[1], ActionBinding::Inline(Action::new(ActionKind::Dismiss)));
    }

    #[test]
    fn action_from_state_value() {
        let value = StateValue::from(serde_json::json!({"type": "navigate", "destination": "home"}));
        let action = Action::from_state_value(&value).unwrap();
        assert_eq!(action.kind, ActionKind::Navigate);
    }
}
