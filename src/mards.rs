//! MARDS document engine
//!
//! Parses indented `key value` text into an ordered, multi-valued entry
//! tree, compiles MARDS schemas (imports, templates, and the
//! `insert`/`extend`/`recurse` macros), and validates documents against
//! them, repairing what can be repaired and reporting the rest.
//!
//! - `lexing` - line scanner and adaptive tab stops
//! - `parsing` - text to entry tree
//! - `node` - the entry tree itself
//! - `schema` - schema compilation and the validation passes
//! - `types` - value typing, built-in and pluggable
//! - `formats` - rendering and JSON/YAML conversion
//! - `diagnostics` - the shared error/warning/log record
//! - `testing` - fluent assertions for tests

pub mod diagnostics;
pub mod formats;
pub mod lexing;
pub mod node;
pub mod parsing;
pub mod schema;
pub mod testing;
pub mod types;

pub use diagnostics::{has_errors, Diagnostic, Location, Origin, Severity};
pub use formats::{convert, delist, render, to_json, to_yaml, FormatError, QuoteStyle};
pub use node::{EntryId, Tree};
pub use parsing::{parse_document, ParseOptions};
pub use schema::{
    check_document, check_document_with, compile_schema, compile_schema_with, CompileOptions,
    FileSource, MemorySource, Schema, SchemaSource,
};
pub use types::{StandardTypes, TypeChecker};

/// Parse a document against a schema in one call
///
/// Compiles the schema (imports resolved from the filesystem), parses the
/// document with the given options, then validates with the standard
/// types. Diagnostics arrive in that order: schema, parse, check.
pub fn parse_with_schema(
    doc_text: &str,
    schema_text: &str,
    options: &ParseOptions,
) -> (Tree, Vec<Diagnostic>) {
    let (schema, mut diagnostics) = compile_schema(schema_text, &CompileOptions::default());
    let (mut doc, parse_diagnostics) = parse_document(doc_text, options);
    diagnostics.extend(parse_diagnostics);
    diagnostics.extend(check_document(&mut doc, &schema));
    (doc, diagnostics)
}
