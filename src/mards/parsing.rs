//! Document parsing
//!
//! Drives the line scanner over whole texts and assembles the entry tree:
//! - `tree_builder` - the per-indent insertion-point machine
//!
//! Parsing is total in adaptive mode: malformed lines are skipped, never
//! fatal. Strict mode reports ragged indents and stops at an indent jump.

pub mod tree_builder;

use crate::mards::diagnostics::{Diagnostic, Origin};
use crate::mards::node::Tree;

pub use tree_builder::BuildError;

/// Knobs for one parse call
///
/// `strict` demands 4-space indents and clean whitespace; `key_open` lets
/// keys start with `#` (used for schema headers); `prefix` is prepended to
/// every entry id, which is how imported schemas get namespaced ids.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub strict: bool,
    pub key_open: bool,
    pub prefix: String,
}

/// Parse document text into an entry tree
pub fn parse_document(text: &str, options: &ParseOptions) -> (Tree, Vec<Diagnostic>) {
    tree_builder::build(text, options, Origin::Doc)
}
