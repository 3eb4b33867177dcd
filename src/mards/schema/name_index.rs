//! Declaration index
//!
//! Maps `(namespace, declared value)` to the seq id of the `name` or
//! `template` entry that declares it. The namespace is the slash-joined id
//! prefix a declaration arrived under, so `""` is the local schema and
//! `"geometry"` holds everything merged from an import named geometry.
//! A value declared twice in one namespace is poisoned rather than
//! resolved, and macro sites that reference it get an error.

use std::collections::HashMap;

use crate::mards::node::Tree;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Slot {
    Unique(String),
    Duplicate,
}

/// Outcome of resolving a macro reference
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The namespace itself is unknown
    NoNamespace,
    /// The namespace exists but never declares the value
    NoName,
    /// Declared more than once, unusable
    Ambiguous,
    /// Seq id of the single declaration, without the compile prefix
    Found(&'a str),
}

#[derive(Debug, Default)]
pub struct NameIndex {
    namespaces: HashMap<String, HashMap<Option<String>, Slot>>,
}

impl NameIndex {
    /// Index every `name` and `template` declaration in the schema
    ///
    /// Seq ids are stored with the compile `prefix` stripped. The local
    /// namespace is always present, even when it declares nothing.
    pub fn build(schema: &Tree, prefix: &str) -> NameIndex {
        let mut namespaces: HashMap<String, HashMap<Option<String>, Slot>> = HashMap::new();
        namespaces.insert(String::new(), HashMap::new());
        for id in schema.grep(None) {
            let element = schema.name(id);
            if element != "name" && element != "template" {
                continue;
            }
            let seq = schema.seq(id);
            let local = seq.strip_prefix(prefix).unwrap_or(seq);
            let namespace = match local.rfind('/') {
                Some(cut) => &local[..cut],
                None => "",
            };
            let value = schema.value(id).map(str::to_string);
            let names = namespaces.entry(namespace.to_string()).or_default();
            match names.get_mut(&value) {
                Some(slot) => *slot = Slot::Duplicate,
                None => {
                    names.insert(value, Slot::Unique(local.to_string()));
                }
            }
        }
        NameIndex { namespaces }
    }

    pub fn lookup(&self, namespace: &str, value: Option<&str>) -> Lookup<'_> {
        let Some(names) = self.namespaces.get(namespace) else {
            return Lookup::NoNamespace;
        };
        match names.get(&value.map(str::to_string)) {
            None => Lookup::NoName,
            Some(Slot::Duplicate) => Lookup::Ambiguous,
            Some(Slot::Unique(seq)) => Lookup::Found(seq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_namespace_always_present() {
        let index = NameIndex::build(&Tree::new(), "");
        assert_eq!(index.lookup("", Some("color")), Lookup::NoName);
        assert_eq!(index.lookup("geo", Some("color")), Lookup::NoNamespace);
    }

    #[test]
    fn test_names_and_templates_indexed() {
        let mut schema = Tree::new();
        schema.append(Tree::ROOT, "name", Some("color".to_string()), "0");
        schema.append(Tree::ROOT, "template", Some("common".to_string()), "1");
        let index = NameIndex::build(&schema, "");
        assert_eq!(index.lookup("", Some("color")), Lookup::Found("0"));
        assert_eq!(index.lookup("", Some("common")), Lookup::Found("1"));
    }

    #[test]
    fn test_duplicate_declaration_poisons_slot() {
        let mut schema = Tree::new();
        schema.append(Tree::ROOT, "name", Some("color".to_string()), "0");
        schema.append(Tree::ROOT, "name", Some("color".to_string()), "4");
        schema.append(Tree::ROOT, "name", Some("size".to_string()), "8");
        let index = NameIndex::build(&schema, "");
        assert_eq!(index.lookup("", Some("color")), Lookup::Ambiguous);
        assert_eq!(index.lookup("", Some("size")), Lookup::Found("8"));
    }

    #[test]
    fn test_imported_ids_split_into_namespaces() {
        let mut schema = Tree::new();
        schema.append(Tree::ROOT, "name", Some("point".to_string()), "geo/2");
        schema.append(Tree::ROOT, "name", Some("edge".to_string()), "geo/lines/3");
        let index = NameIndex::build(&schema, "");
        assert_eq!(index.lookup("geo", Some("point")), Lookup::Found("geo/2"));
        assert_eq!(
            index.lookup("geo/lines", Some("edge")),
            Lookup::Found("geo/lines/3")
        );
        assert_eq!(index.lookup("", Some("point")), Lookup::NoName);
    }

    #[test]
    fn test_compile_prefix_stripped() {
        let mut schema = Tree::new();
        schema.append(Tree::ROOT, "name", Some("point".to_string()), "geo/2");
        let index = NameIndex::build(&schema, "geo/");
        assert_eq!(index.lookup("", Some("point")), Lookup::Found("2"));
    }

    #[test]
    fn test_valueless_declaration_indexed_under_none() {
        let mut schema = Tree::new();
        schema.append(Tree::ROOT, "name", None, "0");
        let index = NameIndex::build(&schema, "");
        assert_eq!(index.lookup("", None), Lookup::Found("0"));
        assert_eq!(index.lookup("", Some("0")), Lookup::NoName);
    }
}
