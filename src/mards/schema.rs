//! Schema compilation and document validation
//!
//! A schema is itself a MARDS document, parsed in strict mode with open
//! keys, then compiled: imports merge, templates register, and the
//! `insert`/`extend`/`recurse` macros expand until only plain rules
//! remain. The compiled [`Schema`] then drives the validator's passes
//! over parsed documents.
//!
//! - `directives` - the closed element vocabulary
//! - `compiler` - the pass pipeline from text to compiled rules
//! - `name_index` - `(namespace, value)` declaration lookup
//! - `resolver` - where import text is loaded from
//! - `specialize` - per-level `search`/`match` and `choice` resolution
//! - `validate` - the five checking passes

pub mod compiler;
pub mod directives;
pub mod name_index;
pub mod resolver;
pub mod specialize;
pub mod validate;

use std::path::PathBuf;

use crate::mards::diagnostics::Diagnostic;
use crate::mards::node::Tree;

pub use compiler::CompileError;
pub use resolver::{FileSource, MemorySource, SchemaSource};
pub use validate::{check_document, check_document_with, CheckError};

/// Knobs for one schema compilation
///
/// `prefix` namespaces every id the compile produces (imports are compiled
/// with the import name as prefix); `schema_dir` is the fallback directory
/// for import files.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub prefix: String,
    pub schema_dir: Option<PathBuf>,
}

/// A compiled schema: rules only, every macro expanded
#[derive(Debug, Clone)]
pub struct Schema {
    tree: Tree,
}

impl Schema {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Whether unmatched document entries are errors
    ///
    /// On by default; a schema opts out with `exclusive false` under its
    /// header.
    pub fn is_exclusive(&self) -> bool {
        match self.tree.find(Tree::ROOT, directives::HEADER) {
            Some(header) => self.tree.get_value(header, "exclusive") != Some("false"),
            None => true,
        }
    }
}

/// Compile schema text, resolving imports from the filesystem
pub fn compile_schema(text: &str, options: &CompileOptions) -> (Schema, Vec<Diagnostic>) {
    compile_schema_with(text, options, &FileSource)
}

/// Compile schema text with explicit options and import source
pub fn compile_schema_with(
    text: &str,
    options: &CompileOptions,
    source: &dyn SchemaSource,
) -> (Schema, Vec<Diagnostic>) {
    let (tree, diagnostics) = compiler::compile(text, options, source);
    (Schema { tree }, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_defaults_on() {
        let (schema, _) =
            compile_schema_with("name a\n", &CompileOptions::default(), &MemorySource::new());
        assert!(schema.is_exclusive());
    }

    #[test]
    fn test_exclusive_false_opts_out() {
        let text = "#!MARDS_schema_en_1.0\n    exclusive false\nname a\n";
        let (schema, _) =
            compile_schema_with(text, &CompileOptions::default(), &MemorySource::new());
        assert!(!schema.is_exclusive());
    }

    #[test]
    fn test_exclusive_other_values_stay_on() {
        let text = "#!MARDS_schema_en_1.0\n    exclusive no\nname a\n";
        let (schema, _) =
            compile_schema_with(text, &CompileOptions::default(), &MemorySource::new());
        assert!(schema.is_exclusive());
    }
}
