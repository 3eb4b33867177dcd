//! Document validation
//!
//! Five passes over a parsed document, each one walking the tree top-down
//! and re-specializing the schema per level on the way:
//!
//! 1. coverage - every entry must match a `name` rule (unless the schema
//!    header opts out with `exclusive false`)
//! 2. requirements - `required` entries are auto-inserted, required values
//!    defaulted or reported
//! 3. treatments - `unique` and `one` prune duplicate entries
//! 4. types - value normalization, delegated through [`TypeChecker`]
//! 5. raises - schema-authored messages attached to matching entries
//!
//! Passes repair as they go: offending entries are deleted, so later
//! passes see a progressively cleaner document.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::mards::diagnostics::{Diagnostic, Location, Origin};
use crate::mards::node::{EntryId, Tree};
use crate::mards::schema::specialize::specialize;
use crate::mards::schema::Schema;
use crate::mards::types::{StandardTypes, TypeChecker};

/// A problem (or repair) found while checking a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("a name of '{name}' not found in schema")]
    NameNotInSchema { name: String },
    #[error("an entry for '{target}' is required so it was automaticaly inserted.")]
    RequiredInserted { target: String },
    #[error("value was required for '{target}' so the default value of '{default}' was used.")]
    DefaultUsed { target: String, default: String },
    #[error("value is required for '{target}' and there is not default value.")]
    ValueRequired { target: String },
    #[error("'{target}' entries should be unique, but this line is a duplicate of line {original}.")]
    DuplicateEntry { target: String, original: String },
    #[error("only one '{target}' entry should exist, but this line is in addition to line {first}.")]
    ExtraEntry { target: String, first: String },
}

/// Validate with the built-in type vocabulary
pub fn check_document(doc: &mut Tree, schema: &Schema) -> Vec<Diagnostic> {
    check_document_with(doc, schema, &StandardTypes::new())
}

/// Validate with a caller-supplied type checker
pub fn check_document_with(
    doc: &mut Tree,
    schema: &Schema,
    types: &dyn TypeChecker,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if schema.is_exclusive() {
        check_coverage(doc, Tree::ROOT, schema.tree(), Tree::ROOT, &mut diagnostics);
    }
    let mut auto_ctr = 0;
    check_requirements(
        doc,
        Tree::ROOT,
        schema.tree(),
        Tree::ROOT,
        &mut auto_ctr,
        &mut diagnostics,
    );
    check_treatments(doc, Tree::ROOT, schema.tree(), Tree::ROOT, &mut diagnostics);
    diagnostics.extend(types.apply(doc, schema));
    check_raises(doc, Tree::ROOT, schema.tree(), Tree::ROOT, &mut diagnostics);
    debug!("checked document: {} diagnostics", diagnostics.len());
    diagnostics
}

/// Entries with no rule at their level are reported and pruned; matching
/// entries recurse into their matching rule, first rule wins
fn check_coverage(
    doc: &mut Tree,
    scope: EntryId,
    schema: &Tree,
    schema_scope: EntryId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let level = specialize(doc, scope, schema, schema_scope);
    let mut doomed = Vec::new();
    for child in doc.children(scope).to_vec() {
        let name = doc.name(child).to_string();
        match level.find_valued(Tree::ROOT, "name", Some(&name)) {
            Some(rule) => check_coverage(doc, child, &level, rule, diagnostics),
            None => {
                diagnostics.push(Diagnostic::error(
                    Origin::Doc,
                    Location::id(doc.seq(child)),
                    CheckError::NameNotInSchema { name }.to_string(),
                ));
                doomed.push(child);
            }
        }
    }
    for child in doomed {
        doc.delete(child);
    }
}

fn check_requirements(
    doc: &mut Tree,
    scope: EntryId,
    schema: &Tree,
    schema_scope: EntryId,
    auto_ctr: &mut usize,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let level = specialize(doc, scope, schema, schema_scope);
    for rule in level.entries_named(Tree::ROOT, "name") {
        let Some(target) = level.value(rule).map(str::to_string) else {
            continue;
        };
        if level.has(rule, "required") && !doc.has(scope, &target) {
            let default = level
                .find(rule, "value")
                .and_then(|value| level.get_value(value, "default"))
                .map(str::to_string);
            let seq = format!("auto{}", *auto_ctr);
            *auto_ctr += 1;
            doc.append(scope, target.clone(), default, seq.clone());
            diagnostics.push(Diagnostic::warning(
                Origin::Doc,
                Location::id(seq),
                CheckError::RequiredInserted {
                    target: target.clone(),
                }
                .to_string(),
            ));
        }
        if let Some(value_rule) = level.find(rule, "value") {
            if level.has(value_rule, "required") {
                let has_default = level.has(value_rule, "default");
                let default = level.get_value(value_rule, "default").map(str::to_string);
                for item in doc.children(scope).to_vec() {
                    if doc.name(item) != target || doc.value(item).is_some() {
                        continue;
                    }
                    if has_default {
                        doc.set_value(item, default.clone());
                        diagnostics.push(Diagnostic::warning(
                            Origin::Doc,
                            Location::id(doc.seq(item)),
                            CheckError::DefaultUsed {
                                target: target.clone(),
                                default: default.as_deref().unwrap_or("None").to_string(),
                            }
                            .to_string(),
                        ));
                    } else {
                        diagnostics.push(Diagnostic::error(
                            Origin::Doc,
                            Location::id(doc.seq(item)),
                            CheckError::ValueRequired {
                                target: target.clone(),
                            }
                            .to_string(),
                        ));
                    }
                }
            }
        }
        for item in doc.children(scope).to_vec() {
            if doc.name(item) == target {
                check_requirements(doc, item, &level, rule, auto_ctr, diagnostics);
            }
        }
    }
}

fn check_treatments(
    doc: &mut Tree,
    scope: EntryId,
    schema: &Tree,
    schema_scope: EntryId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let level = specialize(doc, scope, schema, schema_scope);
    for rule in level.entries_named(Tree::ROOT, "name") {
        let Some(target) = level.value(rule).map(str::to_string) else {
            continue;
        };
        // duplicate rules for one target all defer to the first
        let pointer = level
            .find_valued(Tree::ROOT, "name", Some(&target))
            .unwrap_or(rule);
        let treatment = level
            .get_value(pointer, "treatment")
            .unwrap_or("list")
            .to_string();
        match treatment.as_str() {
            "unique" => prune_duplicates(doc, scope, &target, diagnostics),
            "one" => prune_extras(doc, scope, &target, diagnostics),
            // list needs no checks; sum and average fold at conversion time
            _ => {}
        }
        for item in doc.children(scope).to_vec() {
            if doc.name(item) == target {
                check_treatments(doc, item, &level, pointer, diagnostics);
            }
        }
    }
}

/// `unique`: the first entry per distinct value stays, later repeats of
/// the same value are reported against it and dropped
fn prune_duplicates(
    doc: &mut Tree,
    scope: EntryId,
    target: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let ranked: Vec<(EntryId, usize)> = doc
        .entries_named(scope, target)
        .into_iter()
        .map(|item| (item, doc.occurrence_index(item)))
        .collect();
    let mut first_line: HashMap<Option<String>, String> = HashMap::new();
    let mut doomed = Vec::new();
    for (item, rank) in ranked {
        let value = doc.value(item).map(str::to_string);
        if rank == 0 {
            first_line.insert(value, doc.seq(item).to_string());
        } else {
            let original = first_line.get(&value).cloned().unwrap_or_default();
            diagnostics.push(Diagnostic::error(
                Origin::Doc,
                Location::id(doc.seq(item)),
                CheckError::DuplicateEntry {
                    target: target.to_string(),
                    original,
                }
                .to_string(),
            ));
            doomed.push(item);
        }
    }
    for item in doomed {
        doc.delete(item);
    }
}

/// `one`: only the first entry stays, regardless of value
fn prune_extras(doc: &mut Tree, scope: EntryId, target: &str, diagnostics: &mut Vec<Diagnostic>) {
    let items = doc.entries_named(scope, target);
    let Some((&first, extras)) = items.split_first() else {
        return;
    };
    let first_line = doc.seq(first).to_string();
    for &item in extras {
        diagnostics.push(Diagnostic::error(
            Origin::Doc,
            Location::id(doc.seq(item)),
            CheckError::ExtraEntry {
                target: target.to_string(),
                first: first_line.clone(),
            }
            .to_string(),
        ));
    }
    for &item in extras {
        doc.delete(item);
    }
}

fn check_raises(
    doc: &Tree,
    scope: EntryId,
    schema: &Tree,
    schema_scope: EntryId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let level = specialize(doc, scope, schema, schema_scope);
    let here = if scope == Tree::ROOT {
        Location::Root
    } else {
        Location::id(doc.seq(scope))
    };
    for raise in level.entries_named(Tree::ROOT, "raise_error") {
        diagnostics.push(Diagnostic::error(
            Origin::Doc,
            here.clone(),
            quoted(level.value(raise)),
        ));
    }
    for raise in level.entries_named(Tree::ROOT, "raise_warning") {
        diagnostics.push(Diagnostic::warning(
            Origin::Doc,
            here.clone(),
            quoted(level.value(raise)),
        ));
    }
    for raise in level.entries_named(Tree::ROOT, "raise_log") {
        diagnostics.push(Diagnostic::log(
            Origin::Doc,
            here.clone(),
            quoted(level.value(raise)),
        ));
    }
    for &child in doc.children(scope) {
        if let Some(rule) = level.find_valued(Tree::ROOT, "name", Some(doc.name(child))) {
            check_raises(doc, child, &level, rule, diagnostics);
        }
    }
}

fn quoted(value: Option<&str>) -> String {
    format!("'{}'", value.unwrap_or("None"))
}
