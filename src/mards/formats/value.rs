//! Native value conversion
//!
//! Folds a tree into a `serde_json::Value`. Every scope becomes an object
//! mapping each name to an array; an entry contributes its children (as a
//! nested object) and then its value to that array, in sibling order.
//! [`delist`] collapses the single-element arrays afterward for friendlier
//! output. YAML reuses the same value through `serde_yaml`.

use serde_json::{Map, Value};

use crate::mards::node::{EntryId, Tree};

/// Convert a tree to a JSON object, every name mapped to an array
pub fn to_json(tree: &Tree) -> Value {
    scope_to_json(tree, Tree::ROOT)
}

fn scope_to_json(tree: &Tree, scope: EntryId) -> Value {
    let mut map = Map::new();
    for &child in tree.children(scope) {
        let name = tree.name(child);
        if !tree.children(child).is_empty() {
            push_to(&mut map, name, scope_to_json(tree, child));
        }
        if let Some(value) = tree.value(child) {
            push_to(&mut map, name, Value::String(value.to_string()));
        }
    }
    Value::Object(map)
}

fn push_to(map: &mut Map<String, Value>, name: &str, item: Value) {
    match map.get_mut(name) {
        Some(Value::Array(items)) => items.push(item),
        _ => {
            map.insert(name.to_string(), Value::Array(vec![item]));
        }
    }
}

/// Collapse every single-element array into its sole element, recursively;
/// empty arrays become null
pub fn delist(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut collapsed: Vec<Value> = items.into_iter().map(delist).collect();
            match collapsed.len() {
                0 => Value::Null,
                1 => collapsed.swap_remove(0),
                _ => Value::Array(collapsed),
            }
        }
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(name, item)| (name, delist(item)))
                .collect(),
        ),
        scalar => scalar,
    }
}

/// Render the tree as YAML by way of its delisted JSON value
pub fn to_yaml(tree: &Tree) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&delist(to_json(tree)))
}
