//! Style records as authored in the document's style table.

use serde::{Deserialize, Serialize};

use crate::style::properties::StyleProperties;

/// A named style: typed properties plus an optional parent to inherit from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Parent style id. The chain must be acyclic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    #[serde(flatten)]
    pub properties: StyleProperties,
}

impl Style {
    pub fn new(properties: StyleProperties) -> Self {
        Self {
            inherits: None,
            properties,
        }
    }

    /// Set the parent style (builder).
    pub fn inheriting(mut self, parent: impl Into<String>) -> Self {
        self.inherits = Some(parent.into());
        self
    }
}
