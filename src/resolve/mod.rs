//! Resolution pipeline: Document AST → IR tree.

pub mod context;
pub mod error;
mod layout;
pub mod resolver;
mod section;

pub use context::ResolutionContext;
pub use error::ResolutionError;
pub use resolver::Resolver;
