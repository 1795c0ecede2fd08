//! Component resolvers: how each leaf component type becomes an IR node.

pub mod controls;
pub mod media;
pub mod registry;
pub mod shapes;
pub mod text;

pub use registry::{custom_node, ComponentResolver, ComponentResolverRegistry};
