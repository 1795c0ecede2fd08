//! Action resolution: typed resolved actions and the pluggable kind registry.

pub mod builtin;
pub mod registry;
pub mod resolved;

pub use registry::{
    pass_through, ActionContext, ActionResolutionError, ActionResolver, ActionResolverRegistry,
};
pub use resolved::{ActionParameter, FromParameter, ParameterError, ResolvedAction};
