//! Document AST: values, styles, nodes, data references and actions.

pub mod action;
pub mod data;
#[allow(clippy::module_inception)]
pub mod document;
pub mod node;
pub mod style;
pub mod value;

pub use action::{Action, ActionBinding, ActionKind, ComponentActions, ParameterValue};
pub use data::{DataReference, DataSource};
pub use document::{ColorScheme, Document, DocumentError, RootActions, RootComponent};
pub use node::{
    Alignment, ColumnSpec, Component, ContainerNode, ForEachNode, Node, SectionDefinition,
    SectionKind, SectionLayoutConfig, SectionLayoutNode, SnapBehavior, SpacerNode, StackKind,
};
pub use style::Style;
pub use value::{StateValue, ValueKind};
