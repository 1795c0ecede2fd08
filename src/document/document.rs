//! The document root: state, styles, data sources, actions and the root component.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::action::{Action, ActionBinding};
use super::data::DataSource;
use super::node::Node;
use super::style::Style;
use super::value::StateValue;
use crate::style::properties::{Padding, StyleProperties};

/// Errors from loading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Preferred color scheme of the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorScheme {
    Light,
    Dark,
    #[default]
    System,
}

/// Lifecycle actions on the root.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootActions {
    #[serde(default)]
    pub on_appear: Option<ActionBinding>,
    #[serde(default)]
    pub on_disappear: Option<ActionBinding>,
}

/// The root component of a document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootComponent {
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub edge_insets: Option<Padding>,
    #[serde(default)]
    pub style_id: Option<String>,
    #[serde(default)]
    pub style: Option<StyleProperties>,
    #[serde(default)]
    pub color_scheme: Option<ColorScheme>,
    #[serde(default)]
    pub actions: RootActions,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A parsed document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Initial state, keyed by top-level name.
    #[serde(default)]
    pub state: BTreeMap<String, StateValue>,
    #[serde(default)]
    pub styles: BTreeMap<String, Style>,
    #[serde(default)]
    pub data_sources: BTreeMap<String, DataSource>,
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
    pub root: RootComponent,
}

impl Document {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The initial state as one object value.
    pub fn initial_state(&self) -> StateValue {
        StateValue::Object(self.state.clone())
    }
}
