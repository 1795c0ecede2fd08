//! Resolver configuration.

use crate::actions::ActionContext;
use crate::style::StyleResolver;

/// Limits and switches for one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum nesting of document nodes (containers, forEach, sections).
    pub max_depth: usize,
    /// Maximum length of a style `inherits` chain.
    pub max_inheritance_depth: usize,
    /// Maximum nesting of sequences and action references.
    pub max_action_depth: usize,
    /// Record which state paths each node reads.
    pub track_dependencies: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_inheritance_depth: StyleResolver::DEFAULT_MAX_DEPTH,
            max_action_depth: ActionContext::DEFAULT_MAX_DEPTH,
            track_dependencies: false,
        }
    }
}

impl ResolverConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node nesting limit (builder).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the style chain limit (builder).
    pub fn with_max_inheritance_depth(mut self, depth: usize) -> Self {
        self.max_inheritance_depth = depth;
        self
    }

    /// Set the action nesting limit (builder).
    pub fn with_max_action_depth(mut self, depth: usize) -> Self {
        self.max_action_depth = depth;
        self
    }

    /// Enable or disable dependency tracking (builder).
    pub fn with_dependency_tracking(mut self, enabled: bool) -> Self {
        self.track_dependencies = enabled;
        self
    }
}
