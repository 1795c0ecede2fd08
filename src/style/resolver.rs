//! Style resolver: inheritance-chain merge over the document's style table.
//!
//! Resolution walks the `inherits` chain from the requested style up to its
//! root ancestor, then merges root-to-leaf so that each style overwrites only
//! the fields it defines. Inline overrides are merged last.

use std::collections::{BTreeMap, BTreeSet};

use crate::document::style::Style;
use crate::style::properties::StyleProperties;

/// The merged style for one `(style_id, inline)` pair. Never stored in the IR;
/// it is flattened into a [`FlatStyle`](crate::style::FlatStyle) first.
pub type ResolvedStyle = StyleProperties;

/// Errors raised while walking an inheritance chain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleResolutionError {
    #[error("style inheritance cycle through {0:?}")]
    Cycle(String),
    #[error("unknown style {0:?}")]
    Unknown(String),
    #[error("style chain of {style_id:?} exceeds {limit} levels")]
    DepthExceeded { style_id: String, limit: usize },
}

/// Resolves style ids against a borrowed style table.
#[derive(Debug, Clone, Copy)]
pub struct StyleResolver<'a> {
    styles: &'a BTreeMap<String, Style>,
    max_depth: usize,
}

impl<'a> StyleResolver<'a> {
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    pub fn new(styles: &'a BTreeMap<String, Style>) -> Self {
        Self {
            styles,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit the length of an inheritance chain (builder).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve `style_id` with optional `inline` overrides.
    ///
    /// A missing id yields the defaults (plus inline). An id that is not in the
    /// table, or whose chain references an unknown parent, is an error so the
    /// caller can decide how to recover.
    pub fn resolve(
        &self,
        style_id: Option<&str>,
        inline: Option<&StyleProperties>,
    ) -> Result<ResolvedStyle, StyleResolutionError> {
        let base = match style_id {
            Some(id) => self.chain(id)?.into_iter().rev().fold(
                StyleProperties::new(),
                |acc, style| acc.merge(&style.properties),
            ),
            None => StyleProperties::new(),
        };
        Ok(match inline {
            Some(inline) => base.merge(inline),
            None => base,
        })
    }

    /// The chain from `id` up to its root ancestor, most specific first.
    fn chain(&self, id: &str) -> Result<Vec<&'a Style>, StyleResolutionError> {
        let mut visited = BTreeSet::new();
        let mut chain = Vec::new();
        let mut current = Some(id);

        while let Some(style_id) = current {
            if !visited.insert(style_id) {
                return Err(StyleResolutionError::Cycle(style_id.to_owned()));
            }
            if chain.len() >= self.max_depth {
                return Err(StyleResolutionError::DepthExceeded {
                    style_id: id.to_owned(),
                    limit: self.max_depth,
                });
            }
            let style = self
                .styles
                .get(style_id)
                .ok_or_else(|| StyleResolutionError::Unknown(style_id.to_owned()))?;
            chain.push(style);
            current = style.inherits.as_deref();
        }

        Ok(chain)
    }
}
