//! Built-in action kinds.

use crate::document::action::{Action, ActionKind, ParameterValue};
use crate::document::value::StateValue;

use super::registry::{ActionContext, ActionResolutionError, ActionResolverRegistry};
use super::resolved::{ActionParameter, ResolvedAction};

pub(crate) fn register_defaults(registry: &mut ActionResolverRegistry) {
    registry.register(ActionKind::Dismiss.as_str(), dismiss);
    registry.register(ActionKind::SetState.as_str(), set_state);
    registry.register(ActionKind::ToggleState.as_str(), toggle_state);
    registry.register(ActionKind::ShowAlert.as_str(), show_alert);
    registry.register(ActionKind::Sequence.as_str(), sequence);
    registry.register(ActionKind::Navigate.as_str(), navigate);
    registry.register(ActionKind::NoOp.as_str(), noop);
}

type Resolution = Result<ResolvedAction, ActionResolutionError>;

pub fn dismiss(_: &Action, _: &mut ActionContext<'_>) -> Resolution {
    Ok(ResolvedAction::new(ActionKind::Dismiss))
}

pub fn noop(_: &Action, _: &mut ActionContext<'_>) -> Resolution {
    Ok(ResolvedAction::noop())
}

/// `{path, value}`. `value` may be a literal or a deferred `{"$expr": ...}`;
/// absent means null.
pub fn set_state(action: &Action, _: &mut ActionContext<'_>) -> Resolution {
    let path = required_string(action, "path")?;
    let value = action
        .parameter("value")
        .map(ActionParameter::from)
        .unwrap_or(ActionParameter::Literal(StateValue::Null));
    Ok(ResolvedAction::new(ActionKind::SetState)
        .with_literal("path", path)
        .with_parameter("value", value))
}

pub fn toggle_state(action: &Action, _: &mut ActionContext<'_>) -> Resolution {
    let path = required_string(action, "path")?;
    Ok(ResolvedAction::new(ActionKind::ToggleState).with_literal("path", path))
}

/// `{title, message?, buttons?}`. The message is either a plain string, an
/// object `{"type": "static", "value": ...}`, or a template object
/// `{"template": "..."}`; `messageIsTemplate` records which.
pub fn show_alert(action: &Action, _: &mut ActionContext<'_>) -> Resolution {
    let title = required_string(action, "title")?;
    let mut resolved = ResolvedAction::new(ActionKind::ShowAlert).with_literal("title", title);

    if let Some(message) = action.parameter("message") {
        let (text, is_template) = alert_message(message).ok_or_else(|| {
            wrong_type(action, "message", "string or message object", message)
        })?;
        resolved = resolved
            .with_literal("message", text)
            .with_literal("messageIsTemplate", is_template);
    }

    if let Some(buttons) = action.parameter("buttons") {
        match buttons {
            ParameterValue::Literal(StateValue::Array(items)) => {
                resolved = resolved.with_literal("buttons", items.clone());
            }
            other => return Err(wrong_type(action, "buttons", "array", other)),
        }
    }
    Ok(resolved)
}

fn alert_message(message: &ParameterValue) -> Option<(String, bool)> {
    match message.as_literal()? {
        StateValue::String(text) => Some((text.clone(), false)),
        StateValue::Object(fields) => {
            if let Some(template) = fields.get("template").and_then(StateValue::as_str) {
                Some((template.to_owned(), true))
            } else {
                fields
                    .get("value")
                    .and_then(StateValue::as_str)
                    .map(|text| (text.to_owned(), false))
            }
        }
        _ => None,
    }
}

/// `{steps: [...]}`. A string step references the action table (unknown
/// references become no-ops); an object step is an inline action.
pub fn sequence(action: &Action, ctx: &mut ActionContext<'_>) -> Resolution {
    let steps = match action.parameter("steps") {
        None => return Err(missing(action, "steps")),
        Some(ParameterValue::Literal(StateValue::Array(steps))) => steps,
        Some(other) => return Err(wrong_type(action, "steps", "array", other)),
    };

    let mut resolved = Vec::with_capacity(steps.len());
    for step in steps {
        let step = match step {
            StateValue::String(id) => ctx.resolve_reference(id)?,
            StateValue::Object(_) => {
                let inline = Action::from_state_value(step).map_err(|_| {
                    wrong_type(action, "steps", "action", &ParameterValue::Literal(step.clone()))
                })?;
                ctx.resolve(&inline)?
            }
            other => {
                return Err(wrong_type(
                    action,
                    "steps",
                    "action",
                    &ParameterValue::Literal(other.clone()),
                ))
            }
        };
        resolved.push(step);
    }

    Ok(ResolvedAction::new(ActionKind::Sequence)
        .with_parameter("steps", ActionParameter::Actions(resolved)))
}

/// `{destination, presentation?}`; presentation defaults to `push`.
pub fn navigate(action: &Action, _: &mut ActionContext<'_>) -> Resolution {
    let destination = required_string(action, "destination")?;
    let presentation = match action.parameter("presentation") {
        None => "push".to_owned(),
        Some(ParameterValue::Literal(StateValue::String(mode))) => mode.clone(),
        Some(other) => return Err(wrong_type(action, "presentation", "string", other)),
    };
    Ok(ResolvedAction::new(ActionKind::Navigate)
        .with_literal("destination", destination)
        .with_literal("presentation", presentation))
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

fn required_string(action: &Action, key: &str) -> Result<String, ActionResolutionError> {
    match action.parameter(key) {
        None => Err(missing(action, key)),
        Some(ParameterValue::Literal(StateValue::String(value))) => Ok(value.clone()),
        Some(other) => Err(wrong_type(action, key, "string", other)),
    }
}

fn missing(action: &Action, key: &str) -> ActionResolutionError {
    ActionResolutionError::MissingParameter {
        kind: action.kind.to_string(),
        key: key.to_owned(),
    }
}

fn wrong_type(
    action: &Action,
    key: &str,
    expected: &'static str,
    found: &ParameterValue,
) -> ActionResolutionError {
    ActionResolutionError::WrongType {
        kind: action.kind.to_string(),
        key: key.to_owned(),
        expected,
        found: ActionParameter::from(found).describe(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use pretty_assertions::assert_eq;

    fn resolve(json: &str) -> Resolution {
        let actions: BTreeMap<String, Action> = serde_json::from_str(json).unwrap();
        let registry = ActionResolverRegistry::with_defaults();
        registry.resolve(&actions["main"], &actions)
    }

    #[test]
    fn set_state_keeps_expression_deferred() {
        let resolved = resolve(
            r#"{"main": {"type": "setState", "path": "count", "value": {"$expr": "count + 1"}}}"#,
        )
        .unwrap();
        assert_eq!(resolved.parameter::<String>("path").as_deref(), Some("count"));
        assert_eq!(resolved.expression("value"), Some("count + 1"));
    }

    #[test]
    fn set_state_literal_and_default_value() {
        let literal = resolve(r#"{"main": {"type": "setState", "path": "x", "value": 3}}"#).unwrap();
        assert_eq!(literal.parameter::<i64>("value"), Some(3));
        let absent = resolve(r#"{"main": {"type": "setState", "path": "x"}}"#).unwrap();
        assert_eq!(absent.parameter::<StateValue>("value"), Some(StateValue::Null));
    }

    #[test]
    fn set_state_requires_string_path() {
        assert_eq!(
            resolve(r#"{"main": {"type": "setState", "path": 4}}"#),
            Err(ActionResolutionError::WrongType {
                kind: "setState".into(),
                key: "path".into(),
                expected: "string",
                found: "int".into(),
            })
        );
    }

    #[test]
    fn toggle_state() {
        let resolved = resolve(r#"{"main": {"type": "toggleState", "path": "flags.on"}}"#).unwrap();
        assert_eq!(resolved.kind, ActionKind::ToggleState);
        assert_eq!(resolved.parameter::<String>("path").as_deref(), Some("flags.on"));
    }

    #[test]
    fn show_alert_message_forms() {
        let plain = resolve(
            r#"{"main": {"type": "showAlert", "title": "Hi", "message": "Static"}}"#,
        )
        .unwrap();
        assert_eq!(plain.parameter::<bool>("messageIsTemplate"), Some(false));

        let template = resolve(
            r#"{"main": {"type": "showAlert", "title": "Hi",
                         "message": {"type": "binding", "template": "Count: ${count}"},
                         "buttons": [{"label": "OK"}]}}"#,
        )
        .unwrap();
        assert_eq!(template.parameter::<String>("message").as_deref(), Some("Count: ${count}"));
        assert_eq!(template.parameter::<bool>("messageIsTemplate"), Some(true));
        assert_eq!(template.parameter::<Vec<StateValue>>("buttons").map(|b| b.len()), Some(1));
    }

    #[test]
    fn show_alert_without_title_fails() {
        assert!(matches!(
            resolve(r#"{"main": {"type": "showAlert"}}"#),
            Err(ActionResolutionError::MissingParameter { .. })
        ));
    }

    #[test]
    fn nested_sequences_keep_depth_and_order() {
        let resolved = resolve(
            r#"{"main": {"type": "sequence", "steps": [
                    {"type": "setState", "path": "a", "value": 1},
                    {"type": "sequence", "steps": ["close", "missing"]}
                ]},
                "close": {"type": "dismiss"}}"#,
        )
        .unwrap();

        let steps: Vec<ResolvedAction> = resolved.required_parameter("steps").unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].kind, ActionKind::SetState);
        let inner: Vec<ResolvedAction> = steps[1].required_parameter("steps").unwrap();
        assert_eq!(
            inner,
            vec![ResolvedAction::new(ActionKind::Dismiss), ResolvedAction::noop()]
        );
    }

    #[test]
    fn navigate_defaults_presentation() {
        let resolved =
            resolve(r#"{"main": {"type": "navigate", "destination": "detail"}}"#).unwrap();
        assert_eq!(resolved.parameter::<String>("presentation").as_deref(), Some("push"));
    }
}
