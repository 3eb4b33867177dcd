//! Built-in value types
//!
//! string, label, boolean, integer, float, hexadecimal, and ignore, plus
//! pass-through for schema-defined `define_type` vocabularies. Values are
//! normalized in place: booleans to `true`/`false`, integers to plain
//! decimal, floats to scientific notation, hexadecimal to its lowercase
//! digits. An entry whose value fails its type is reported and removed
//! once its level has been walked.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::mards::diagnostics::{Diagnostic, Location, Origin};
use crate::mards::node::{EntryId, Tree};
use crate::mards::schema::specialize::specialize;
use crate::mards::schema::{compile_schema_with, CompileOptions, MemorySource, Schema};
use crate::mards::types::TypeChecker;

/// Schema fragment declaring the built-in types; merged into every schema
/// under the `std_type.` id prefix before the pass runs
const BUILTIN_SCHEMA: &str = "\
#!MARDS_schema_en_1.0
define_type string
define_type label
define_type boolean
    unit true
        * true
        * yes
        * on
        * 1
    unit false
        * false
        * no
        * off
        * 0
define_type integer
define_type float
define_type hexadecimal
define_type ignore
";

static BUILTIN_RULES: Lazy<Tree> = Lazy::new(|| {
    let (schema, _) =
        compile_schema_with(BUILTIN_SCHEMA, &CompileOptions::default(), &MemorySource::new());
    schema.into_tree()
});

/// Separator or punctuation, except the `_` `.` `*` a label may carry
static LABEL_REJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[[\p{Z}\p{P}^]--[_.*]]").unwrap());

/// The built-in [`TypeChecker`]
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardTypes;

impl StandardTypes {
    pub fn new() -> StandardTypes {
        StandardTypes
    }
}

impl TypeChecker for StandardTypes {
    fn apply(&self, doc: &mut Tree, schema: &Schema) -> Vec<Diagnostic> {
        let mut extended = schema.tree().copy_children(Tree::ROOT, "", "");
        extended.extend_from(Tree::ROOT, &BUILTIN_RULES, Tree::ROOT, "std_type.", None);
        let mut diagnostics = Vec::new();
        apply_level(
            doc,
            Tree::ROOT,
            schema.tree(),
            Tree::ROOT,
            &extended,
            &mut diagnostics,
        );
        diagnostics
    }
}

fn apply_level(
    doc: &mut Tree,
    scope: EntryId,
    schema: &Tree,
    schema_scope: EntryId,
    extended: &Tree,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let level = specialize(doc, scope, schema, schema_scope);
    let mut doomed = Vec::new();
    for item in doc.children(scope).to_vec() {
        let name = doc.name(item).to_string();
        let Some(rule) = level.find_valued(Tree::ROOT, "name", Some(&name)) else {
            continue;
        };
        if let Some(type_rule) = level
            .find(rule, "value")
            .and_then(|value| level.find(value, "type"))
        {
            let before = diagnostics.len();
            normalize(doc, item, &level, type_rule, extended, diagnostics);
            if diagnostics[before..].iter().any(Diagnostic::is_error) {
                doomed.push(item);
            }
        }
        if !doc.children(item).is_empty() {
            apply_level(doc, item, &level, rule, extended, diagnostics);
        }
    }
    for item in doomed {
        doc.delete(item);
    }
}

fn normalize(
    doc: &mut Tree,
    item: EntryId,
    level: &Tree,
    type_rule: EntryId,
    extended: &Tree,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let type_name = level.value(type_rule).map(str::to_string);
    let defined = extended.find_valued(Tree::ROOT, "define_type", type_name.as_deref());
    match type_name.as_deref() {
        Some("string") => {}
        Some("label") => check_label(doc, item, diagnostics),
        Some("boolean") => normalize_boolean(doc, item, defined, extended, diagnostics),
        Some("integer") => normalize_integer(doc, item, diagnostics),
        Some("float") => normalize_float(doc, item, diagnostics),
        Some("hexadecimal") => normalize_hexadecimal(doc, item, diagnostics),
        Some("ignore") => doc.set_value(item, None),
        _ if defined.is_some() => {}
        _ => diagnostics.push(Diagnostic::error(
            Origin::Schema,
            Location::id(level.seq(type_rule)),
            format!("'type {}' unknown.", type_name.as_deref().unwrap_or("None")),
        )),
    }
}

fn check_label(doc: &Tree, item: EntryId, diagnostics: &mut Vec<Diagnostic>) {
    let Some(value) = doc.value(item) else {
        return;
    };
    if let Some(found) = LABEL_REJECT.find(value) {
        diagnostics.push(Diagnostic::error(
            Origin::Doc,
            Location::id(doc.seq(item)),
            format!(
                "'{} {}' has characters not permitted. Detail: '{}'",
                doc.name(item),
                value,
                found.as_str()
            ),
        ));
    }
}

fn normalize_boolean(
    doc: &mut Tree,
    item: EntryId,
    defined: Option<EntryId>,
    extended: &Tree,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(raw) = doc.value(item).map(str::to_string) else {
        return;
    };
    let value = raw.to_lowercase();
    let listed = |flag: &str| -> bool {
        defined
            .and_then(|d| extended.find_valued(d, "unit", Some(flag)))
            .map_or(false, |unit| {
                extended
                    .list_values(unit, "*")
                    .into_iter()
                    .flatten()
                    .any(|word| word == value)
            })
    };
    if listed("true") {
        doc.set_value(item, Some("true".to_string()));
    } else if listed("false") {
        doc.set_value(item, Some("false".to_string()));
    } else {
        diagnostics.push(Diagnostic::error(
            Origin::Doc,
            Location::id(doc.seq(item)),
            format!("unable to determine if '{raw}' is true or false."),
        ));
    }
}

fn normalize_integer(doc: &mut Tree, item: EntryId, diagnostics: &mut Vec<Diagnostic>) {
    let Some(raw) = doc.value(item).map(str::to_string) else {
        return;
    };
    let trimmed = raw.trim();
    if let Ok(number) = trimmed.parse::<i128>() {
        doc.set_value(item, Some(number.to_string()));
        return;
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => {
            if trimmed.contains('.') {
                diagnostics.push(Diagnostic::warning(
                    Origin::Doc,
                    Location::id(doc.seq(item)),
                    "trimming off fractional part of number.",
                ));
            }
            // ties round to even, matching decimal quantization
            doc.set_value(item, Some(format!("{:.0}", number.round_ties_even())));
        }
        Ok(_) => {
            diagnostics.push(Diagnostic::error(
                Origin::Doc,
                Location::id(doc.seq(item)),
                format!("unable to convert '{raw}' into an integer. msg: not a finite number"),
            ));
        }
        Err(err) => {
            diagnostics.push(Diagnostic::error(
                Origin::Doc,
                Location::id(doc.seq(item)),
                format!("unable to convert '{raw}' into an integer. msg: {err}"),
            ));
        }
    }
}

fn normalize_float(doc: &mut Tree, item: EntryId, diagnostics: &mut Vec<Diagnostic>) {
    let Some(raw) = doc.value(item).map(str::to_string) else {
        return;
    };
    match raw.trim().parse::<f64>() {
        Ok(number) => doc.set_value(item, Some(format!("{number:e}"))),
        Err(err) => diagnostics.push(Diagnostic::error(
            Origin::Doc,
            Location::id(doc.seq(item)),
            format!("unable to convert '{raw}' into a floating point number. msg: {err}"),
        )),
    }
}

fn normalize_hexadecimal(doc: &mut Tree, item: EntryId, diagnostics: &mut Vec<Diagnostic>) {
    let Some(raw) = doc.value(item).map(str::to_string) else {
        return;
    };
    let (kept, rejected): (String, String) = raw
        .to_lowercase()
        .chars()
        .partition(|c| c.is_ascii_hexdigit());
    if !rejected.is_empty() {
        let listed = rejected
            .chars()
            .map(String::from)
            .collect::<Vec<_>>()
            .join(", ");
        diagnostics.push(Diagnostic::warning(
            Origin::Doc,
            Location::id(doc.seq(item)),
            format!(
                "'{} {}' has characters not permitted: '{}'",
                doc.name(item),
                raw,
                listed
            ),
        ));
    }
    doc.set_value(item, Some(kept));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mards::diagnostics::{has_errors, Severity};
    use crate::mards::parsing::{parse_document, ParseOptions};

    fn checked(schema_text: &str, doc_text: &str) -> (Tree, Vec<Diagnostic>) {
        let (schema, diagnostics) =
            compile_schema_with(schema_text, &CompileOptions::default(), &MemorySource::new());
        assert!(diagnostics.is_empty(), "schema diagnostics: {diagnostics:?}");
        let (mut doc, parse_diagnostics) = parse_document(doc_text, &ParseOptions::default());
        assert!(parse_diagnostics.is_empty());
        let diagnostics = StandardTypes::new().apply(&mut doc, &schema);
        (doc, diagnostics)
    }

    fn typed_schema(type_name: &str) -> String {
        format!("name field\n    value\n        type {type_name}\n")
    }

    fn field_value(doc: &Tree) -> Option<String> {
        doc.find(Tree::ROOT, "field")
            .and_then(|id| doc.value(id))
            .map(str::to_string)
    }

    #[test]
    fn test_builtin_schema_compiles_clean() {
        let (_, diagnostics) = compile_schema_with(
            BUILTIN_SCHEMA,
            &CompileOptions::default(),
            &MemorySource::new(),
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert!(BUILTIN_RULES
            .find_valued(Tree::ROOT, "define_type", Some("boolean"))
            .is_some());
    }

    #[test]
    fn test_string_left_untouched() {
        let (doc, diagnostics) = checked(&typed_schema("string"), "field  spaced out \n");
        assert!(diagnostics.is_empty());
        assert_eq!(field_value(&doc).as_deref(), Some("spaced out"));
    }

    #[test]
    fn test_boolean_word_forms_normalize() {
        let (doc, diagnostics) = checked(&typed_schema("boolean"), "field YES\n");
        assert!(diagnostics.is_empty());
        assert_eq!(field_value(&doc).as_deref(), Some("true"));

        let (doc, diagnostics) = checked(&typed_schema("boolean"), "field Off\n");
        assert!(diagnostics.is_empty());
        assert_eq!(field_value(&doc).as_deref(), Some("false"));
    }

    #[test]
    fn test_boolean_unknown_word_removes_entry() {
        let (doc, diagnostics) = checked(&typed_schema("boolean"), "field maybe\n");
        assert_eq!(
            diagnostics[0].message,
            "unable to determine if 'maybe' is true or false."
        );
        assert!(doc.find(Tree::ROOT, "field").is_none());
    }

    #[test]
    fn test_integer_canonicalizes() {
        let (doc, diagnostics) = checked(&typed_schema("integer"), "field 007\n");
        assert!(diagnostics.is_empty());
        assert_eq!(field_value(&doc).as_deref(), Some("7"));
    }

    #[test]
    fn test_integer_fraction_trimmed_with_warning() {
        let (doc, diagnostics) = checked(&typed_schema("integer"), "field 4.5\n");
        assert_eq!(
            diagnostics[0].message,
            "trimming off fractional part of number."
        );
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(field_value(&doc).as_deref(), Some("4"));
    }

    #[test]
    fn test_integer_garbage_removes_entry() {
        let (doc, diagnostics) = checked(&typed_schema("integer"), "field seven\n");
        assert!(has_errors(&diagnostics));
        assert!(diagnostics[0]
            .message
            .starts_with("unable to convert 'seven' into an integer."));
        assert!(doc.find(Tree::ROOT, "field").is_none());
    }

    #[test]
    fn test_float_normalizes_to_scientific() {
        let (doc, diagnostics) = checked(&typed_schema("float"), "field 12.5\n");
        assert!(diagnostics.is_empty());
        assert_eq!(field_value(&doc).as_deref(), Some("1.25e1"));
    }

    #[test]
    fn test_hexadecimal_filters_with_warning() {
        let (doc, diagnostics) = checked(&typed_schema("hexadecimal"), "field 0xFF\n");
        assert_eq!(
            diagnostics[0].message,
            "'field 0xFF' has characters not permitted: 'x'"
        );
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        // warnings keep the entry, value is the surviving digits
        assert_eq!(field_value(&doc).as_deref(), Some("0ff"));
    }

    #[test]
    fn test_label_rejects_separators() {
        let (_, diagnostics) = checked(&typed_schema("label"), "field two words\n");
        assert!(has_errors(&diagnostics));
        assert!(diagnostics[0]
            .message
            .starts_with("'field two words' has characters not permitted."));
    }

    #[test]
    fn test_label_allows_underscore_dot_star() {
        let (_, diagnostics) = checked(&typed_schema("label"), "field file_v2.bak*\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_ignore_clears_value() {
        let (doc, diagnostics) = checked(&typed_schema("ignore"), "field noise\n");
        assert!(diagnostics.is_empty());
        let field = doc.find(Tree::ROOT, "field").unwrap();
        assert_eq!(doc.value(field), None);
    }

    #[test]
    fn test_schema_defined_type_passes_through() {
        let schema_text = "define_type kelvin\nname field\n    value\n        type kelvin\n";
        let (doc, diagnostics) = checked(schema_text, "field 273\n");
        assert!(diagnostics.is_empty());
        assert_eq!(field_value(&doc).as_deref(), Some("273"));
    }

    #[test]
    fn test_unknown_type_reported_against_schema() {
        let (doc, diagnostics) = checked(&typed_schema("wibble"), "field x\n");
        assert_eq!(diagnostics[0].message, "'type wibble' unknown.");
        assert_eq!(diagnostics[0].origin, Origin::Schema);
        assert_eq!(diagnostics[0].location, Location::id("2"));
        assert!(doc.find(Tree::ROOT, "field").is_none());
    }

    #[test]
    fn test_nested_levels_normalized() {
        let schema_text = "\
name server
    name port
        value
            type integer
";
        let (doc, diagnostics) = checked(schema_text, "server web\n    port 08080\n");
        assert!(diagnostics.is_empty());
        let server = doc.find(Tree::ROOT, "server").unwrap();
        let port = doc.find(server, "port").unwrap();
        assert_eq!(doc.value(port), Some("8080"));
    }
}
