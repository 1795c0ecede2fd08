//! Expression language: templates, ternaries, array helpers and integer
//! arithmetic evaluated against live state.

pub mod arithmetic;
pub mod evaluator;
pub mod scope;
pub mod tokenizer;

pub use evaluator::{evaluate, evaluate_condition, interpolate, ExpressionEvaluator};
pub use scope::{Scope, ScopeEntry, ScopeHit, ScopedReader, StateReader};
