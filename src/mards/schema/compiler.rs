//! Schema compilation
//!
//! Turns schema text into a flat rule tree through a fixed pass order:
//! vocabulary sweep, import merging, template capture, `insert` expansion,
//! `extend` expansion, `recurse` expansion, default value/type fill, and
//! header cleanup. The compiled result holds rules only; every macro has
//! been expanded, or reported and removed.
//!
//! Expansion works against a frozen copy of the schema taken right after
//! imports merge. Sites are replaced in the live tree with subtrees copied
//! out of the frozen copy, so a pass can never read its own output.

use thiserror::Error;
use tracing::debug;

use crate::mards::diagnostics::{Diagnostic, Location, Origin};
use crate::mards::node::{EntryId, Tree};
use crate::mards::parsing::{tree_builder, ParseOptions};
use crate::mards::schema::directives;
use crate::mards::schema::name_index::{Lookup, NameIndex};
use crate::mards::schema::resolver::SchemaSource;
use crate::mards::schema::CompileOptions;

/// Passes an expansion loop may run before leftovers are swept as cycles
const EXPANSION_CAP: usize = 20;

/// A problem found while compiling a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("'{name}' not a recognized schema element name")]
    UnknownElement { name: String },
    #[error("the 'limit' element may only be applied to a 'recurse'")]
    LimitOutsideRecurse,
    #[error("the 'limit' should have a integer value between 1 and 20")]
    LimitRange,
    #[error("unable to locate import method for '{target}'")]
    ImportMethodMissing { target: String },
    #[error("an import for '{namespace}' not found in schema")]
    ImportNotFound { namespace: String },
    #[error("on {verb}, a name or template for '{target}' not found in local schema")]
    TargetNotFoundLocal { verb: String, target: String },
    #[error("on {verb}, a name or template for '{target}' not found in schema '{from}'")]
    TargetNotFoundIn {
        verb: String,
        target: String,
        from: String,
    },
    #[error("'name {target}' found in schema multiple times")]
    AmbiguousTarget { target: String },
    #[error("'{verb} {target}' ends up forming a loop. See lines {lines}. ")]
    ExpansionLoop {
        verb: String,
        target: String,
        lines: String,
    },
    #[error("internal empty child error src='{src}'. ")]
    EmptyExtendTarget { src: String },
    #[error("recurse limit is not a positive integer.")]
    RecurseLimitInvalid,
    #[error("'recurse {target}' is not recursive")]
    NotRecursive { target: String },
}

pub(crate) fn compile(
    text: &str,
    options: &CompileOptions,
    source: &dyn SchemaSource,
) -> (Tree, Vec<Diagnostic>) {
    let parse = ParseOptions {
        strict: true,
        key_open: true,
        prefix: options.prefix.clone(),
    };
    let (mut schema, mut diagnostics) = tree_builder::build(text, &parse, Origin::Schema);
    check_vocabulary(&mut schema, &mut diagnostics);
    resolve_imports(&mut schema, options, source, &mut diagnostics);
    let mut copy = schema.copy_children(Tree::ROOT, "", "");
    let index = NameIndex::build(&schema, &options.prefix);
    capture_templates(&mut schema, &mut copy, &options.prefix);
    expand_inserts(&mut schema, &copy, &index, &options.prefix, &mut diagnostics);
    expand_extends(&mut schema, &copy, &index, &options.prefix, &mut diagnostics);
    expand_recursions(&mut schema, &copy, &index, &options.prefix, &mut diagnostics);
    fill_defaults(&mut schema);
    clean_headers(&mut schema);
    debug!(
        "compiled schema: {} top-level entries, {} diagnostics",
        schema.len(),
        diagnostics.len()
    );
    (schema, diagnostics)
}

fn shown(value: Option<&str>) -> &str {
    value.unwrap_or("None")
}

fn report(schema: &Tree, id: EntryId, error: CompileError, diagnostics: &mut Vec<Diagnostic>) {
    diagnostics.push(Diagnostic::error(
        Origin::Schema,
        Location::id(schema.seq(id)),
        error.to_string(),
    ));
}

/// Report and remove everything outside the schema vocabulary; `##`
/// comments go quietly, `limit` is range- and placement-checked here
fn check_vocabulary(schema: &mut Tree, diagnostics: &mut Vec<Diagnostic>) {
    for id in schema.grep(None) {
        let name = schema.name(id).to_string();
        match name.as_str() {
            directives::NOTE => schema.delete(id),
            "limit" => check_limit(schema, id, diagnostics),
            _ if directives::is_recognized(&name) => {}
            _ => {
                report(
                    schema,
                    id,
                    CompileError::UnknownElement { name: name.clone() },
                    diagnostics,
                );
                schema.delete(id);
            }
        }
    }
}

fn check_limit(schema: &mut Tree, id: EntryId, diagnostics: &mut Vec<Diagnostic>) {
    if !schema.is_alive(id) {
        return;
    }
    let under_recurse = schema
        .parent(id)
        .map_or(false, |up| schema.name(up) == "recurse");
    if !under_recurse {
        report(schema, id, CompileError::LimitOutsideRecurse, diagnostics);
        schema.delete(id);
        return;
    }
    let in_range = schema.value(id).map_or(false, |raw| {
        !raw.is_empty()
            && raw.chars().all(|c| c.is_ascii_digit())
            && raw
                .parse::<u32>()
                .map_or(false, |n| (1..=20).contains(&n))
    });
    if !in_range {
        report(schema, id, CompileError::LimitRange, diagnostics);
        schema.delete(id);
    }
}

/// Compile and merge every import named under a schema header
///
/// Each import gets an id namespace: its value plus `/`, or `./` for a
/// bare import. The imported text is compiled recursively under the
/// combined prefix and merged with ids retained.
fn resolve_imports(
    schema: &mut Tree,
    options: &CompileOptions,
    source: &dyn SchemaSource,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for header in schema.entries_named(Tree::ROOT, directives::HEADER) {
        for import in schema.entries_named(header, "import") {
            let import_value = schema.value(import).map(str::to_string);
            let namespace = match import_value.as_deref() {
                Some(value) => format!("{value}/"),
                None => "./".to_string(),
            };
            let Some(local) = schema.find(import, "local") else {
                report(
                    schema,
                    import,
                    CompileError::ImportMethodMissing {
                        target: shown(import_value.as_deref()).to_string(),
                    },
                    diagnostics,
                );
                continue;
            };
            let mut candidates = Vec::new();
            let named = match (schema.value(local), import_value.as_deref()) {
                (Some(path), _) => Some(path.to_string()),
                (None, Some(value)) => Some(format!("{value}.MARDS-schema")),
                (None, None) => None,
            };
            if let Some(path) = named {
                candidates.push(path.clone());
                if let Some(dir) = &options.schema_dir {
                    candidates.push(dir.join(&path).to_string_lossy().into_owned());
                }
            }
            let mut text = None;
            let mut last_err = None;
            for candidate in &candidates {
                match source.load(candidate) {
                    Ok(data) => {
                        text = Some(data);
                        break;
                    }
                    Err(err) => last_err = Some(err),
                }
            }
            let Some(text) = text else {
                let message = match last_err {
                    Some(err) => err.to_string(),
                    None => CompileError::ImportMethodMissing {
                        target: shown(import_value.as_deref()).to_string(),
                    }
                    .to_string(),
                };
                diagnostics.push(Diagnostic::error(
                    Origin::Schema,
                    Location::id(schema.seq(import)),
                    message,
                ));
                continue;
            };
            if text.is_empty() {
                continue;
            }
            let sub_options = CompileOptions {
                prefix: format!("{}{}", options.prefix, namespace),
                schema_dir: options.schema_dir.clone(),
            };
            let (sub, sub_diagnostics) = compile(&text, &sub_options, source);
            schema.extend_from(Tree::ROOT, &sub, Tree::ROOT, "", None);
            diagnostics.extend(sub_diagnostics);
        }
    }
}

/// Templates leave the live tree (at the outermost compile only) but are
/// renamed to `name` in the frozen copy, which is what makes them
/// insertable without ever matching a document directly
fn capture_templates(schema: &mut Tree, copy: &mut Tree, prefix: &str) {
    for id in schema.grep(Some("template")) {
        let seq = schema.seq(id).to_string();
        if prefix.is_empty() {
            schema.delete(id);
        }
        if let Some(in_copy) = copy.by_seq(&seq) {
            copy.set_name(in_copy, "name");
        }
    }
}

/// Resolve a macro site's target declaration, reporting the failure modes
/// in the site's own terms; `None` means a diagnostic was pushed
fn resolve_target(
    schema: &Tree,
    id: EntryId,
    index: &NameIndex,
    prefix: &str,
    verb: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let value = schema.value(id);
    let from = schema.get_value(id, "from").unwrap_or("");
    match index.lookup(from, value) {
        Lookup::NoNamespace => {
            report(
                schema,
                id,
                CompileError::ImportNotFound {
                    namespace: from.to_string(),
                },
                diagnostics,
            );
            None
        }
        Lookup::NoName => {
            let error = if from.is_empty() {
                CompileError::TargetNotFoundLocal {
                    verb: verb.to_string(),
                    target: shown(value).to_string(),
                }
            } else {
                CompileError::TargetNotFoundIn {
                    verb: verb.to_string(),
                    target: shown(value).to_string(),
                    from: from.to_string(),
                }
            };
            report(schema, id, error, diagnostics);
            None
        }
        Lookup::Ambiguous => {
            report(
                schema,
                id,
                CompileError::AmbiguousTarget {
                    target: shown(value).to_string(),
                },
                diagnostics,
            );
            None
        }
        Lookup::Found(stripped) => Some(format!("{prefix}{stripped}")),
    }
}

fn cycle_error(schema: &Tree, id: EntryId, verb: &str, lineage: &[String]) -> CompileError {
    CompileError::ExpansionLoop {
        verb: verb.to_string(),
        target: shown(schema.value(id)).to_string(),
        lines: lineage.join(","),
    }
}

/// Delete any macro entries a capped loop left behind; inserts and
/// extends report as cycles, recursions just stop
fn sweep_macro_residue(schema: &mut Tree, verb: &str, diagnostics: &mut Vec<Diagnostic>) {
    for id in schema.grep(Some(verb)) {
        if !schema.is_alive(id) {
            continue;
        }
        if verb != "recurse" {
            let lineage = schema.lineage(id);
            let error = cycle_error(schema, id, verb, &lineage);
            report(schema, id, error, diagnostics);
        }
        schema.delete(id);
    }
}

/// Replace each `insert` site with a copy of its target declaration; the
/// site keeps its own id, copied descendants get the target id as prefix
fn expand_inserts(
    schema: &mut Tree,
    copy: &Tree,
    index: &NameIndex,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut passes = 0;
    let mut sites = schema.grep(Some("insert"));
    while !sites.is_empty() && passes < EXPANSION_CAP {
        for id in sites {
            if !schema.is_alive(id) {
                continue;
            }
            let Some(src) = resolve_target(schema, id, index, prefix, "insert", diagnostics)
            else {
                schema.delete(id);
                continue;
            };
            let lineage = schema.lineage(id);
            if lineage.iter().any(|seq| *seq == src) {
                let error = cycle_error(schema, id, "insert", &lineage);
                report(schema, id, error, diagnostics);
                schema.delete(id);
                continue;
            }
            match copy.by_seq(&src) {
                Some(target) => {
                    let graft_prefix = format!("{src}.");
                    schema.replace_with_copy(id, copy, target, &graft_prefix);
                }
                None => schema.delete(id),
            }
        }
        sites = schema.grep(Some("insert"));
        passes += 1;
    }
    sweep_macro_residue(schema, "insert", diagnostics);
}

/// Splice each `extend` target's children (minus its first `value` child)
/// in as siblings of the site, then drop the site
fn expand_extends(
    schema: &mut Tree,
    copy: &Tree,
    index: &NameIndex,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut passes = 0;
    let mut sites = schema.grep(Some("extend"));
    while !sites.is_empty() && passes < EXPANSION_CAP {
        for id in sites {
            if !schema.is_alive(id) {
                continue;
            }
            let Some(src) = resolve_target(schema, id, index, prefix, "extend", diagnostics)
            else {
                schema.delete(id);
                continue;
            };
            let lineage = schema.lineage(id);
            if lineage.iter().any(|seq| *seq == src) {
                let error = cycle_error(schema, id, "extend", &lineage);
                report(schema, id, error, diagnostics);
                schema.delete(id);
                continue;
            }
            let scope = schema.parent(id).unwrap_or(Tree::ROOT);
            match copy.by_seq(&src) {
                Some(target) if !copy.children(target).is_empty() => {
                    let graft_prefix = format!("{src}.");
                    schema.extend_from(scope, copy, target, &graft_prefix, Some("value"));
                }
                _ => {
                    report(
                        schema,
                        id,
                        CompileError::EmptyExtendTarget { src: src.clone() },
                        diagnostics,
                    );
                }
            }
            schema.delete(id);
        }
        sites = schema.grep(Some("extend"));
        passes += 1;
    }
    sweep_macro_residue(schema, "extend", diagnostics);
}

/// Re-expand each `recurse` site one level per pass until its limit is
/// reached, then remove it; a site outside its target's expansion is an
/// error since there is nothing to recurse into
fn expand_recursions(
    schema: &mut Tree,
    copy: &Tree,
    index: &NameIndex,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut passes = 0;
    let mut sites = schema.grep(Some("recurse"));
    while !sites.is_empty() && passes < EXPANSION_CAP {
        let depth = passes + 1;
        for id in sites {
            if !schema.is_alive(id) {
                continue;
            }
            let Some(src) = resolve_target(schema, id, index, prefix, "recurse", diagnostics)
            else {
                schema.delete(id);
                continue;
            };
            let limit = match schema.get_value(id, "limit") {
                None => 2,
                Some(raw) => match raw.trim().parse::<i64>() {
                    Ok(n) => n.unsigned_abs() as usize,
                    Err(_) => {
                        report(schema, id, CompileError::RecurseLimitInvalid, diagnostics);
                        2
                    }
                },
            };
            let lineage = schema.lineage(id);
            if lineage.iter().any(|seq| *seq == src) {
                if depth <= limit {
                    match copy.by_seq(&src) {
                        Some(target) => {
                            let graft_prefix = format!("{src}.r{depth}.");
                            schema.replace_with_copy(id, copy, target, &graft_prefix);
                        }
                        None => schema.delete(id),
                    }
                } else {
                    schema.delete(id);
                }
            } else {
                report(
                    schema,
                    id,
                    CompileError::NotRecursive {
                        target: shown(schema.value(id)).to_string(),
                    },
                    diagnostics,
                );
                schema.delete(id);
            }
        }
        sites = schema.grep(Some("recurse"));
        passes += 1;
    }
    sweep_macro_residue(schema, "recurse", diagnostics);
}

/// Every `name` rule ends up with a `value` child and a `type` under it;
/// the fallback type is `string`
fn fill_defaults(schema: &mut Tree) {
    for id in schema.grep(Some("name")) {
        let seq = schema.seq(id).to_string();
        match schema.find(id, "value") {
            Some(value_child) => {
                if !schema.has(value_child, "type") {
                    schema.append(
                        value_child,
                        "type",
                        Some("string".to_string()),
                        format!("{seq}.auto_type"),
                    );
                }
            }
            None => {
                let value_child = schema.append(id, "value", None, format!("{seq}.auto_val"));
                schema.append(
                    value_child,
                    "type",
                    Some("string".to_string()),
                    format!("{seq}.auto_val.auto_type"),
                );
            }
        }
    }
}

/// Keep the first header, stripped of its imports; drop the rest
fn clean_headers(schema: &mut Tree) {
    let headers = schema.entries_named(Tree::ROOT, directives::HEADER);
    let Some((&first, rest)) = headers.split_first() else {
        return;
    };
    for import in schema.entries_named(first, "import") {
        schema.delete(import);
    }
    for &extra in rest {
        schema.delete(extra);
    }
}
