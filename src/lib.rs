//! # scals-core
//!
//! A renderer-agnostic UI compiler. A declarative JSON document describing
//! screens, styles, state and actions is resolved into a flat, fully styled
//! IR tree plus a live state store that drives incremental updates.
//!
//! Renderers (native widgets, HTML) consume the IR; none live here.
//!
//! ## Core Systems
//!
//! - **[`document`]**: The authored AST, parsed with serde
//! - **[`state`]**: Path-addressed state store with change callbacks
//! - **[`expr`]**: Expression evaluator: templates, ternaries, arithmetic, array helpers
//! - **[`style`]**: Style inheritance with clear sentinels, flattened for the IR
//! - **[`ir`]**: Slotmap-backed render tree and every node kind
//! - **[`actions`]**: Action resolver registry and resolved actions
//! - **[`components`]**: Component resolver registry and built-in leaf types
//! - **[`resolve`]**: The resolution pipeline: root, layout, forEach, sections
//! - **[`reactive`]**: Dependency graph and live sessions
//! - **[`config`]**: Resolver limits and switches
//!
//! ## Example
//!
//! ```
//! use scals_core::document::Document;
//! use scals_core::resolve::Resolver;
//!
//! let document = Document::from_json(
//!     r#"{"id": "hello", "state": {"name": "Ada"},
//!         "root": {"children": [{"type": "text", "text": "Hello ${name}"}]}}"#,
//! )?;
//! let tree = Resolver::new().resolve_or_empty(&document);
//! assert_eq!(tree.children(tree.root()).len(), 1);
//! # Ok::<(), scals_core::document::DocumentError>(())
//! ```

// Foundation
pub mod config;
pub mod document;
pub mod state;

// Evaluation and styling
pub mod expr;
pub mod style;

// Output
pub mod ir;

// Registries
pub mod actions;
pub mod components;

// Pipeline
pub mod reactive;
pub mod resolve;

pub use config::ResolverConfig;
pub use document::{Document, DocumentError};
pub use ir::RenderTree;
pub use reactive::{DependencyGraph, ReactiveSession};
pub use resolve::{ResolutionError, Resolver};
pub use state::StateStore;
