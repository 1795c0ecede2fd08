//! Style properties, inheritance resolution and flattening.

pub mod flatten;
pub mod properties;
pub mod resolver;

pub use flatten::{EdgeInsets, FlatShadow, FlatStyle, NodeOverrides};
pub use properties::{FontWeight, Padding, Shadow, StyleProperties, TextAlignment};
pub use resolver::{ResolvedStyle, StyleResolutionError, StyleResolver};
