//! Dependency tracking and live updates.
//!
//! - [`DependencyGraph`] maps state paths to the IR nodes that read them.
//! - [`ReactiveSession`] owns a document, its tree and graph, and keeps the
//!   tree current as state is written.

pub mod session;
pub mod tracker;

pub use session::{ReactiveSession, SessionError, StateUpdate};
pub use tracker::{DependencyGraph, DependencyKind};
