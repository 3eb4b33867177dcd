//! Schema specialization
//!
//! Before a document level is checked, its schema level is specialized
//! against the document's actual values. `search` blocks pick the `match`
//! branch whose value equals the document's and splice its children in at
//! the top; `choice` lists under a rule's `type` splice the matching
//! choice's children into that rule. The result is a transient copy; rule
//! seq ids survive, so diagnostics keep pointing at the source schema.

use crate::mards::node::{EntryId, Tree};

/// Spliced content can introduce further `search` blocks; passes beyond
/// this many are treated as a self-feeding splice and abandoned
const SPLICE_CAP: usize = 20;

/// Copy the schema level under `schema_scope` and resolve its conditional
/// content against the document level under `scope`
pub fn specialize(doc: &Tree, scope: EntryId, schema: &Tree, schema_scope: EntryId) -> Tree {
    let mut copy = schema.copy_children(schema_scope, "", "");
    apply_searches(doc, scope, &mut copy);
    apply_choices(doc, scope, &mut copy);
    copy
}

fn apply_searches(doc: &Tree, scope: EntryId, copy: &mut Tree) {
    let mut passes = 0;
    let mut searches = copy.entries_named(Tree::ROOT, "search");
    while !searches.is_empty() && passes < SPLICE_CAP {
        for search in searches {
            if !copy.is_alive(search) {
                continue;
            }
            let doc_value = copy
                .value(search)
                .and_then(|target| doc.get_value(scope, target))
                .map(str::to_string);
            let picked = copy
                .entries_named(search, "match")
                .into_iter()
                .find(|&m| copy.value(m) == doc_value.as_deref())
                .or_else(|| copy.find(search, "match_else"));
            if let Some(branch) = picked {
                let grafted = copy.copy_children(branch, "match.", "");
                copy.extend_from(Tree::ROOT, &grafted, Tree::ROOT, "", None);
            }
            copy.delete(search);
        }
        searches = copy.entries_named(Tree::ROOT, "search");
        passes += 1;
    }
}

fn apply_choices(doc: &Tree, scope: EntryId, copy: &mut Tree) {
    for rule in copy.entries_named(Tree::ROOT, "name") {
        let Some(type_rule) = copy
            .find(rule, "value")
            .and_then(|value| copy.find(value, "type"))
        else {
            continue;
        };
        let target = copy.value(rule).map(str::to_string);
        let doc_value = target
            .as_deref()
            .and_then(|t| doc.get_value(scope, t))
            .map(str::to_string);
        let Some(choice) = copy
            .entries_named(type_rule, "choice")
            .into_iter()
            .find(|&c| copy.value(c) == doc_value.as_deref())
        else {
            continue;
        };
        let Some(dest) = copy.find_valued(Tree::ROOT, "name", target.as_deref()) else {
            continue;
        };
        let grafted = copy.copy_children(choice, "choice.", "");
        copy.extend_from(dest, &grafted, Tree::ROOT, "", None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(pairs: &[(&str, Option<&str>)]) -> Tree {
        let mut doc = Tree::new();
        for (ctr, (name, value)) in pairs.iter().enumerate() {
            doc.append(
                Tree::ROOT,
                *name,
                value.map(str::to_string),
                ctr.to_string(),
            );
        }
        doc
    }

    #[test]
    fn test_search_splices_matching_branch() {
        let mut schema = Tree::new();
        let search = schema.append(Tree::ROOT, "search", Some("mode".to_string()), "0");
        let fast = schema.append(search, "match", Some("fast".to_string()), "1");
        schema.append(fast, "name", Some("burst".to_string()), "2");
        let slow = schema.append(search, "match", Some("slow".to_string()), "3");
        schema.append(slow, "name", Some("pace".to_string()), "4");

        let doc = doc_with(&[("mode", Some("fast"))]);
        let level = specialize(&doc, Tree::ROOT, &schema, Tree::ROOT);

        assert!(level.find(Tree::ROOT, "search").is_none());
        let spliced = level.find_valued(Tree::ROOT, "name", Some("burst")).unwrap();
        assert_eq!(level.seq(spliced), "match.2");
        assert!(level.find_valued(Tree::ROOT, "name", Some("pace")).is_none());
    }

    #[test]
    fn test_search_falls_back_to_match_else() {
        let mut schema = Tree::new();
        let search = schema.append(Tree::ROOT, "search", Some("mode".to_string()), "0");
        let fast = schema.append(search, "match", Some("fast".to_string()), "1");
        schema.append(fast, "name", Some("burst".to_string()), "2");
        let other = schema.append(search, "match_else", None, "3");
        schema.append(other, "name", Some("steady".to_string()), "4");

        let doc = doc_with(&[("mode", Some("weird"))]);
        let level = specialize(&doc, Tree::ROOT, &schema, Tree::ROOT);

        assert!(level.find_valued(Tree::ROOT, "name", Some("burst")).is_none());
        assert!(level.find_valued(Tree::ROOT, "name", Some("steady")).is_some());
    }

    #[test]
    fn test_bare_match_catches_missing_value() {
        let mut schema = Tree::new();
        let search = schema.append(Tree::ROOT, "search", Some("mode".to_string()), "0");
        let bare = schema.append(search, "match", None, "1");
        schema.append(bare, "name", Some("quiet".to_string()), "2");

        // no `mode` entry at all reads as a missing value
        let doc = doc_with(&[("other", Some("x"))]);
        let level = specialize(&doc, Tree::ROOT, &schema, Tree::ROOT);
        assert!(level.find_valued(Tree::ROOT, "name", Some("quiet")).is_some());
    }

    #[test]
    fn test_unmatched_search_just_disappears() {
        let mut schema = Tree::new();
        let search = schema.append(Tree::ROOT, "search", Some("mode".to_string()), "0");
        schema.append(search, "match", Some("fast".to_string()), "1");

        let doc = doc_with(&[("mode", Some("slow"))]);
        let level = specialize(&doc, Tree::ROOT, &schema, Tree::ROOT);
        assert!(level.is_empty());
    }

    #[test]
    fn test_choice_splices_into_rule() {
        let mut schema = Tree::new();
        let rule = schema.append(Tree::ROOT, "name", Some("color".to_string()), "0");
        let value = schema.append(rule, "value", None, "1");
        let vtype = schema.append(value, "type", Some("label".to_string()), "2");
        let red = schema.append(vtype, "choice", Some("red".to_string()), "3");
        schema.append(red, "raise_log", Some("warm".to_string()), "4");
        let blue = schema.append(vtype, "choice", Some("blue".to_string()), "5");
        schema.append(blue, "raise_log", Some("cool".to_string()), "6");

        let doc = doc_with(&[("color", Some("blue"))]);
        let level = specialize(&doc, Tree::ROOT, &schema, Tree::ROOT);

        let rule = level.find_valued(Tree::ROOT, "name", Some("color")).unwrap();
        let raised = level.find(rule, "raise_log").unwrap();
        assert_eq!(level.value(raised), Some("cool"));
        assert_eq!(level.seq(raised), "choice.6");
    }

    #[test]
    fn test_choice_without_document_value_skipped() {
        let mut schema = Tree::new();
        let rule = schema.append(Tree::ROOT, "name", Some("color".to_string()), "0");
        let value = schema.append(rule, "value", None, "1");
        let vtype = schema.append(value, "type", Some("label".to_string()), "2");
        schema.append(vtype, "choice", Some("red".to_string()), "3");

        let doc = doc_with(&[("color", Some("green"))]);
        let level = specialize(&doc, Tree::ROOT, &schema, Tree::ROOT);

        let rule = level.find_valued(Tree::ROOT, "name", Some("color")).unwrap();
        assert!(level.find(rule, "raise_log").is_none());
        // the unchosen choice stays where it was declared
        let vtype = level
            .find(rule, "value")
            .and_then(|v| level.find(v, "type"))
            .unwrap();
        assert_eq!(level.entries_named(vtype, "choice").len(), 1);
    }
}
