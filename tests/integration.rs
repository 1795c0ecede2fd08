//! Integration tests for scals-core.
//!
//! These tests exercise the public API from outside the crate: documents are
//! parsed from JSON, resolved into render trees, and driven through sessions.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use scals_core::actions::{ActionParameter, ResolvedAction};
use scals_core::document::{ActionKind, StateValue, Style};
use scals_core::expr::{evaluate, interpolate};
use scals_core::ir::{ActionRef, NodeId, RenderNodeKind};
use scals_core::style::{Shadow, StyleProperties, StyleResolver};
use scals_core::{Document, ReactiveSession, RenderTree, ResolutionError, Resolver, StateStore};

fn resolve(json: &str) -> RenderTree {
    Resolver::new()
        .resolve(&Document::from_json(json).unwrap())
        .unwrap()
}

fn text(tree: &RenderTree, id: NodeId) -> String {
    match &tree.get(id).unwrap().kind {
        RenderNodeKind::Text(text) => text.content.text(),
        other => panic!("expected text, got {}", other.name()),
    }
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

fn style_table() -> BTreeMap<String, Style> {
    let styles: BTreeMap<String, Style> = serde_json::from_str(
        r#"{
            "A": {"fontSize": 10, "shadow": {"color": "black", "radius": 4}},
            "B": {"inherits": "A", "fontSize": 20},
            "C": {"inherits": "A", "shadow": {}}
        }"#,
    )
    .unwrap();
    styles
}

#[test]
fn test_override_priority() {
    let styles = style_table();
    let resolver = StyleResolver::new(&styles);

    assert_eq!(resolver.resolve(Some("A"), None).unwrap().font_size, Some(10.0));
    assert_eq!(resolver.resolve(Some("B"), None).unwrap().font_size, Some(20.0));

    let inline = StyleProperties {
        font_size: Some(30.0),
        ..StyleProperties::default()
    };
    assert_eq!(
        resolver.resolve(Some("B"), Some(&inline)).unwrap().font_size,
        Some(30.0)
    );
    assert_eq!(resolver.resolve(None, None).unwrap(), StyleProperties::new());
}

#[test]
fn test_style_resolution_is_pure() {
    let styles = style_table();
    let resolver = StyleResolver::new(&styles);
    let inline = StyleProperties {
        text_color: Some("red".into()),
        ..StyleProperties::default()
    };
    assert_eq!(
        resolver.resolve(Some("B"), Some(&inline)),
        resolver.resolve(Some("B"), Some(&inline))
    );
}

#[test]
fn test_shadow_clear_versus_absence() {
    let styles = style_table();
    let resolver = StyleResolver::new(&styles);

    let inherited = resolver.resolve(Some("B"), None).unwrap();
    assert_eq!(
        inherited.shadow,
        Some(Shadow {
            color: Some("black".into()),
            radius: Some(4.0),
            ..Shadow::default()
        })
    );

    let cleared = resolver.resolve(Some("C"), None).unwrap();
    assert_eq!(cleared.shadow, None);
    assert_eq!(cleared.font_size, Some(10.0));
}

#[test]
fn test_flattened_style_reaches_the_tree() {
    let tree = resolve(
        r#"{
            "id": "styled",
            "styles": {
                "A": {"fontSize": 10, "textColor": "gray"},
                "B": {"inherits": "A", "fontSize": 20}
            },
            "root": {"children": [
                {"type": "text", "id": "plain", "text": "x", "styleId": "B"},
                {"type": "text", "id": "inline", "text": "y", "styleId": "B", "style": {"fontSize": 30}}
            ]}
        }"#,
    );
    let style_of = |id: &str| {
        let node = tree.find_by_id(id).unwrap();
        tree.get(node).unwrap().kind.style().cloned().unwrap()
    };
    assert_eq!(style_of("plain").font_size, Some(20.0));
    assert_eq!(style_of("inline").font_size, Some(30.0));
    assert_eq!(style_of("inline").text_color.as_deref(), Some("gray"));
    assert_eq!(style_of("inline").opacity, 1.0);
}

#[test]
fn test_unknown_style_is_a_diagnostic() {
    let tree = resolve(
        r#"{"id": "s", "root": {"children": [{"type": "text", "text": "x", "styleId": "missing"}]}}"#,
    );
    assert_eq!(
        tree.diagnostics,
        vec![ResolutionError::UnknownStyle("missing".into())]
    );
    assert_eq!(tree.children(tree.root()).len(), 1);
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[test]
fn test_arithmetic() {
    let mut state = StateStore::new();
    state.set("count", 5).unwrap();
    state.set("zero", 0).unwrap();

    assert_eq!(evaluate("(2 + 3) % 4", &state), StateValue::Int(1));
    assert_eq!(evaluate("count - 1", &state), StateValue::Int(4));
    assert_eq!(evaluate("count % zero", &state), StateValue::from("count % zero"));
}

#[test]
fn test_template_interpolation() {
    let mut state = StateStore::new();
    state.set("index", 0).unwrap();
    insta::assert_snapshot!(interpolate("Item ${(index + 1)}/3", &state), @"Item 1/3");
}

#[test]
fn test_array_contains() {
    let mut state = StateStore::new();
    state
        .set("items", StateValue::Array(vec!["a".into(), "b".into(), "c".into()]))
        .unwrap();
    assert_eq!(evaluate("items.contains(\"b\")", &state), StateValue::Bool(true));
    assert_eq!(evaluate("items.count", &state), StateValue::Int(3));
}

// ---------------------------------------------------------------------------
// State callbacks
// ---------------------------------------------------------------------------

#[test]
fn test_callbacks_run_in_registration_order() {
    let mut state = StateStore::new();
    state.set("x", 0).unwrap();

    let log: Rc<RefCell<Vec<(&str, String, Option<StateValue>, StateValue)>>> =
        Rc::new(RefCell::new(Vec::new()));
    for name in ["c1", "c2"] {
        let sink = Rc::clone(&log);
        state.on_state_change(move |change| {
            sink.borrow_mut().push((
                name,
                change.path.to_owned(),
                change.old_value.cloned(),
                change.new_value.clone(),
            ));
        });
    }
    state.set("x", 1).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            ("c1", "x".to_owned(), Some(StateValue::Int(0)), StateValue::Int(1)),
            ("c2", "x".to_owned(), Some(StateValue::Int(0)), StateValue::Int(1)),
        ]
    );
}

#[test]
fn test_removed_callback_is_not_called() {
    let mut state = StateStore::new();
    let calls = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&calls);
    let id = state.on_state_change(move |_| *sink.borrow_mut() += 1);

    state.set("x", 1).unwrap();
    assert!(state.remove_state_change_callback(id));
    state.set("x", 2).unwrap();
    assert_eq!(*calls.borrow(), 1);
}

// ---------------------------------------------------------------------------
// forEach
// ---------------------------------------------------------------------------

#[test]
fn test_for_each_expands_in_order() {
    let tree = resolve(
        r#"{
            "id": "list",
            "state": {"items": ["a", "b", "c"]},
            "root": {"children": [{
                "type": "forEach", "id": "rows", "items": "items",
                "template": {"type": "text", "text": "Item ${(index + 1)}/3: ${item}"}
            }]}
        }"#,
    );
    let rows = tree.find_by_id("rows").unwrap();
    let labels: Vec<String> = tree.children(rows).iter().map(|&id| text(&tree, id)).collect();
    assert_eq!(labels, vec!["Item 1/3: a", "Item 2/3: b", "Item 3/3: c"]);
}

#[test]
fn test_for_each_over_empty_array() {
    let with_empty_view = resolve(
        r#"{
            "id": "empty",
            "state": {"items": []},
            "root": {"children": [{
                "type": "forEach", "items": "items",
                "template": {"type": "text", "text": "${item}"},
                "emptyView": {"type": "text", "text": "Nothing here"}
            }]}
        }"#,
    );
    let children = with_empty_view.children(with_empty_view.root());
    assert_eq!(children.len(), 1);
    assert_eq!(text(&with_empty_view, children[0]), "Nothing here");

    let without = resolve(
        r#"{
            "id": "empty",
            "state": {"items": []},
            "root": {"children": [{
                "type": "forEach", "items": "items",
                "template": {"type": "text", "text": "${item}"}
            }]}
        }"#,
    );
    let container = without.children(without.root())[0];
    assert!(matches!(
        without.get(container).unwrap().kind,
        RenderNodeKind::Container(_)
    ));
    assert!(without.children(container).is_empty());
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

const ACTIONS: &str = r#"{
    "id": "actions",
    "actions": {
        "track": {"type": "analytics", "event": "open", "count": 2},
        "close": {"type": "dismiss"},
        "flow": {"type": "sequence", "steps": [
            "close",
            {"type": "sequence", "steps": [
                {"type": "setState", "path": "count", "value": {"$expr": "count + 1"}},
                "track"
            ]}
        ]}
    },
    "root": {
        "actions": {"onAppear": "track"},
        "children": [
            {"type": "button", "id": "go", "text": "Go", "actions": {"onTap": "flow"}},
            {"type": "button", "id": "lost", "text": "Lost", "actions": {"onTap": "nowhere"}}
        ]
    }
}"#;

#[test]
fn test_unregistered_action_passes_through() {
    let tree = resolve(ACTIONS);
    let track = &tree.actions["track"];
    assert_eq!(track.kind, ActionKind::Custom("analytics".into()));
    assert_eq!(track.parameter::<String>("event").as_deref(), Some("open"));
    assert_eq!(track.parameter::<i64>("count"), Some(2));
    assert_eq!(track.parameters.len(), 2);
    assert_eq!(tree.root_node.on_appear, Some(ActionRef::Named("track".into())));
}

#[test]
fn test_sequence_nesting() {
    let tree = resolve(ACTIONS);
    let outer = tree.actions["flow"]
        .parameter::<Vec<ResolvedAction>>("steps")
        .unwrap();
    assert_eq!(outer.len(), 2);
    assert_eq!(outer[0].kind, ActionKind::Dismiss);
    assert_eq!(outer[1].kind, ActionKind::Sequence);

    let inner = outer[1].parameter::<Vec<ResolvedAction>>("steps").unwrap();
    assert_eq!(inner.len(), 2);
    assert_eq!(inner[0].kind, ActionKind::SetState);
    assert_eq!(inner[0].expression("value"), Some("count + 1"));
    assert_eq!(inner[1].kind, ActionKind::Custom("analytics".into()));
    assert_eq!(
        inner[1].parameters.get("event"),
        Some(&ActionParameter::Literal("open".into()))
    );
}

#[test]
fn test_unknown_action_reference_becomes_noop() {
    let tree = resolve(ACTIONS);
    let on_tap = |id: &str| match &tree.get(tree.find_by_id(id).unwrap()).unwrap().kind {
        RenderNodeKind::Button(button) => button.on_tap.clone(),
        other => panic!("expected button, got {}", other.name()),
    };
    assert_eq!(on_tap("go"), Some(ActionRef::Named("flow".into())));
    assert_eq!(on_tap("lost"), Some(ActionRef::Inline(ResolvedAction::noop())));
    assert_eq!(
        tree.diagnostics,
        vec![ResolutionError::UnknownAction("nowhere".into())]
    );
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[test]
fn test_malformed_document_is_rejected() {
    assert!(Document::from_json(r#"{"id": "x", "root": {"children": [{"text": "no type"}]}}"#).is_err());
}

#[test]
fn test_resolve_or_empty_on_depth_overflow() {
    let document = Document::from_json(
        r#"{"id": "deep", "root": {"children": [
            {"type": "vstack", "children": [{"type": "vstack", "children": [
                {"type": "vstack", "children": [{"type": "text", "text": "deep"}]}
            ]}]}
        ]}}"#,
    )
    .unwrap();
    let resolver =
        Resolver::new().with_config(scals_core::ResolverConfig::new().with_max_depth(2));

    assert!(matches!(
        resolver.resolve(&document),
        Err(ResolutionError::DepthExceeded { limit: 2 })
    ));
    let tree = resolver.resolve_or_empty(&document);
    assert!(tree.children(tree.root()).is_empty());
    assert!(tree.actions.is_empty());
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[test]
fn test_session_updates_dependent_nodes() {
    let document = Document::from_json(
        r#"{
            "id": "counter",
            "state": {"count": 0, "done": false, "tags": ["a"]},
            "root": {"children": [
                {"type": "text", "id": "label", "text": "Count: ${count}"},
                {"type": "text", "id": "status", "text": "${done ? 'Done' : 'Open'} at ${count}"},
                {"type": "forEach", "id": "tags", "items": "tags", "template": {"type": "text", "text": "${item}"}}
            ]}
        }"#,
    )
    .unwrap();
    let mut session = ReactiveSession::new(document).unwrap();
    let label = session.tree().find_by_id("label").unwrap();
    let status = session.tree().find_by_id("status").unwrap();

    let update = session.set("count", 1).unwrap();
    assert!(!update.rebuilt);
    assert_eq!(update.changed, vec![label, status]);
    assert_eq!(text(session.tree(), label), "Count: 1");

    let update = session.toggle("done").unwrap();
    assert_eq!(update.changed, vec![status]);
    assert_eq!(text(session.tree(), status), "Done at 1");

    let update = session
        .set("tags", StateValue::Array(vec!["a".into(), "b".into()]))
        .unwrap();
    assert!(update.rebuilt);
    let tags = session.tree().find_by_id("tags").unwrap();
    assert_eq!(session.tree().children(tags).len(), 2);
    assert_eq!(session.get("count"), Some(&StateValue::Int(1)));
}
