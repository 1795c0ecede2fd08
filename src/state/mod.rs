//! Live state: path parsing, the state store and change notification.

pub mod path;
pub mod store;

pub use path::{descend, PathSegment, StatePath};
pub use store::{StateChange, StateError, StateStore, SubscriptionId, MAX_INDEX_GAP};
