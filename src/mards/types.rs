//! Value typing
//!
//! The validator's type pass is delegated through the [`TypeChecker`]
//! trait, so an application can swap in its own vocabulary. `standard`
//! implements the built-in one.

pub mod standard;

pub use standard::StandardTypes;

use crate::mards::diagnostics::Diagnostic;
use crate::mards::node::Tree;
use crate::mards::schema::Schema;

/// Normalizes every typed value in a document against its schema
///
/// Implementations walk the document themselves: the pass owns value
/// rewriting and the removal of entries whose values fail their type.
pub trait TypeChecker {
    fn apply(&self, doc: &mut Tree, schema: &Schema) -> Vec<Diagnostic>;
}
