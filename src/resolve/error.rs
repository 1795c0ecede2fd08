//! Resolution errors.

use crate::actions::ActionResolutionError;
use crate::style::StyleResolutionError;

/// A problem met while resolving a document.
///
/// Every variant except [`DepthExceeded`](Self::DepthExceeded) is
/// recoverable: the resolver substitutes a neutral value, logs a warning and
/// keeps the error in [`RenderTree::diagnostics`](crate::ir::RenderTree::diagnostics).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("unknown style {0:?}")]
    UnknownStyle(String),
    #[error(transparent)]
    Style(#[from] StyleResolutionError),
    #[error("unknown data source {0:?}")]
    UnknownDataSource(String),
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    #[error("action {action_id:?} failed to resolve: {source}")]
    Action {
        action_id: String,
        #[source]
        source: ActionResolutionError,
    },
    #[error("{component_type} component is invalid: {reason}")]
    InvalidComponent {
        component_type: String,
        reason: String,
    },
    #[error("document nesting exceeds {limit} levels")]
    DepthExceeded { limit: usize },
}

impl ResolutionError {
    pub fn invalid_component(component_type: &str, reason: impl Into<String>) -> Self {
        Self::InvalidComponent {
            component_type: component_type.to_owned(),
            reason: reason.into(),
        }
    }

    /// Whether resolution must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DepthExceeded { .. })
    }
}
