//! Data references: where a component's displayed value comes from.

use serde::{Deserialize, Serialize};

use super::value::StateValue;

/// A reference to a value, resolved at resolution time into a literal or a
/// live binding marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DataReference {
    /// A fixed value.
    Static { value: StateValue },
    /// A state path or a `${...}` template. Exactly one should be set; the
    /// path wins when both are.
    Binding {
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        template: Option<String>,
    },
    /// A named entry of the document's `dataSources` table.
    #[serde(rename = "dataSource")]
    Source { id: String },
}

impl DataReference {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Binding {
            path: Some(path.into()),
            template: None,
        }
    }

    pub fn template(template: impl Into<String>) -> Self {
        Self::Binding {
            path: None,
            template: Some(template.into()),
        }
    }
}

/// A document-level data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DataSource {
    Static { value: StateValue },
    Binding { path: String },
}
