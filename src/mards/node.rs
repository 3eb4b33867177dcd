//! Entry tree
//!
//! The ordered, multi-valued tree shared by documents and schemas. Entries
//! live in an arena (a flat `Vec`) and are addressed by copyable `EntryId`
//! handles; a hidden root entry at slot 0 makes every scope an `EntryId`.
//! Deleted entries are tombstoned, never reused, so handles taken before a
//! mutation can be re-checked with `is_alive` afterward.
//!
//! Every entry also carries a structural string id ("seq") assigned at
//! creation. Copies rewrite seqs as `prefix + original + suffix`, which is
//! what makes macro expansion and lineage-based cycle checks addressable.
//!
//! Sibling order is insertion order and is semantically significant:
//! first-match-wins lookups and occurrence indexes both depend on it.

/// Arena handle for one entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    value: Option<String>,
    seq: String,
    children: Vec<EntryId>,
    parent: EntryId,
    alive: bool,
}

/// An ordered forest of named, optionally valued entries
#[derive(Clone, Debug, Default)]
pub struct Tree {
    arena: Vec<Entry>,
}

impl Tree {
    /// Scope handle for the top level of the tree
    pub const ROOT: EntryId = EntryId(0);

    pub fn new() -> Self {
        Tree {
            arena: vec![Entry {
                name: String::new(),
                value: None,
                seq: String::new(),
                children: Vec::new(),
                parent: EntryId(0),
                alive: true,
            }],
        }
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.arena[0].children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena[0].children.is_empty()
    }

    /// Whether the entry is still attached to the tree
    pub fn is_alive(&self, id: EntryId) -> bool {
        self.arena[id.0].alive
    }

    pub fn name(&self, id: EntryId) -> &str {
        &self.arena[id.0].name
    }

    pub fn value(&self, id: EntryId) -> Option<&str> {
        self.arena[id.0].value.as_deref()
    }

    pub fn seq(&self, id: EntryId) -> &str {
        &self.arena[id.0].seq
    }

    pub fn set_name(&mut self, id: EntryId, name: impl Into<String>) {
        self.arena[id.0].name = name.into();
    }

    pub fn set_value(&mut self, id: EntryId, value: Option<String>) {
        self.arena[id.0].value = value;
    }

    /// Live children of a scope, in sibling order
    pub fn children(&self, scope: EntryId) -> &[EntryId] {
        &self.arena[scope.0].children
    }

    /// Append a new entry under `scope` with an explicit seq id
    pub fn append(
        &mut self,
        scope: EntryId,
        name: impl Into<String>,
        value: Option<String>,
        seq: impl Into<String>,
    ) -> EntryId {
        let id = EntryId(self.arena.len());
        self.arena.push(Entry {
            name: name.into(),
            value,
            seq: seq.into(),
            children: Vec::new(),
            parent: scope,
            alive: true,
        });
        self.arena[scope.0].children.push(id);
        id
    }

    /// Append and report the new entry's occurrence index
    pub fn append_index(
        &mut self,
        scope: EntryId,
        name: impl Into<String>,
        value: Option<String>,
        seq: impl Into<String>,
    ) -> (EntryId, usize) {
        let id = self.append(scope, name, value, seq);
        (id, self.occurrence_index(id))
    }

    /// 0-based rank among siblings sharing this entry's `(name, value)` pair
    ///
    /// Recomputed from the live sibling list, so ranks shift as earlier
    /// duplicates are deleted.
    pub fn occurrence_index(&self, id: EntryId) -> usize {
        let entry = &self.arena[id.0];
        self.arena[entry.parent.0]
            .children
            .iter()
            .take_while(|&&sib| sib != id)
            .filter(|&&sib| {
                self.arena[sib.0].name == entry.name && self.arena[sib.0].value == entry.value
            })
            .count()
    }

    /// First child of `scope` with the given name
    pub fn find(&self, scope: EntryId, name: &str) -> Option<EntryId> {
        self.children(scope)
            .iter()
            .copied()
            .find(|&c| self.arena[c.0].name == name)
    }

    /// First child of `scope` with the given name and exact value
    pub fn find_valued(&self, scope: EntryId, name: &str, value: Option<&str>) -> Option<EntryId> {
        self.children(scope)
            .iter()
            .copied()
            .find(|&c| self.arena[c.0].name == name && self.arena[c.0].value.as_deref() == value)
    }

    /// Nth child of `scope` with the given name and value
    pub fn find_indexed(
        &self,
        scope: EntryId,
        name: &str,
        value: Option<&str>,
        index: usize,
    ) -> Option<EntryId> {
        self.children(scope)
            .iter()
            .copied()
            .filter(|&c| self.arena[c.0].name == name && self.arena[c.0].value.as_deref() == value)
            .nth(index)
    }

    /// All children of `scope` with the given name, in order
    pub fn entries_named(&self, scope: EntryId, name: &str) -> Vec<EntryId> {
        self.children(scope)
            .iter()
            .copied()
            .filter(|&c| self.arena[c.0].name == name)
            .collect()
    }

    pub fn has(&self, scope: EntryId, name: &str) -> bool {
        self.find(scope, name).is_some()
    }

    /// Value of the first child named `name`, if any
    ///
    /// Absent entries and valueless entries both read as `None`.
    pub fn get_value(&self, scope: EntryId, name: &str) -> Option<&str> {
        self.find(scope, name)
            .and_then(|id| self.arena[id.0].value.as_deref())
    }

    /// Values of every child named `name`, in order
    pub fn list_values(&self, scope: EntryId, name: &str) -> Vec<Option<&str>> {
        self.children(scope)
            .iter()
            .filter(|&&c| self.arena[c.0].name == name)
            .map(|&c| self.arena[c.0].value.as_deref())
            .collect()
    }

    /// Every entry in the whole tree, depth-first preorder, optionally
    /// filtered by name (the walk still descends into filtered-out entries)
    pub fn grep(&self, name: Option<&str>) -> Vec<EntryId> {
        let mut out = Vec::new();
        self.walk(Self::ROOT, name, &mut out);
        out
    }

    fn walk(&self, scope: EntryId, name: Option<&str>, out: &mut Vec<EntryId>) {
        for &child in self.children(scope) {
            if name.map_or(true, |n| self.arena[child.0].name == n) {
                out.push(child);
            }
            self.walk(child, name, out);
        }
    }

    /// Resolve a seq id to its entry, first match in depth-first order
    pub fn by_seq(&self, seq: &str) -> Option<EntryId> {
        self.find_seq(Self::ROOT, seq)
    }

    fn find_seq(&self, scope: EntryId, seq: &str) -> Option<EntryId> {
        for &child in self.children(scope) {
            if self.arena[child.0].seq == seq {
                return Some(child);
            }
            if let Some(found) = self.find_seq(child, seq) {
                return Some(found);
            }
        }
        None
    }

    /// Parent entry, or `None` for a top-level entry
    pub fn parent(&self, id: EntryId) -> Option<EntryId> {
        let parent = self.arena[id.0].parent;
        if parent == Self::ROOT {
            None
        } else {
            Some(parent)
        }
    }

    /// Seq ids from the outermost ancestor down to the entry itself
    pub fn lineage(&self, id: EntryId) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cursor = id;
        loop {
            chain.push(self.arena[cursor.0].seq.clone());
            match self.parent(cursor) {
                Some(up) => cursor = up,
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Detach an entry and tombstone its whole subtree
    pub fn delete(&mut self, id: EntryId) {
        if !self.arena[id.0].alive {
            return;
        }
        let parent = self.arena[id.0].parent;
        self.arena[parent.0].children.retain(|&c| c != id);
        self.tombstone(id);
    }

    /// Delete by seq id; silently a no-op when the seq is already gone
    pub fn delete_seq(&mut self, seq: &str) {
        if let Some(id) = self.by_seq(seq) {
            self.delete(id);
        }
    }

    fn tombstone(&mut self, id: EntryId) {
        self.arena[id.0].alive = false;
        let children = self.arena[id.0].children.clone();
        for child in children {
            self.tombstone(child);
        }
    }

    /// New tree holding copies of this scope's children, seqs rewritten to
    /// `prefix + original + suffix`
    pub fn copy_children(&self, scope: EntryId, prefix: &str, suffix: &str) -> Tree {
        let mut out = Tree::new();
        for &child in self.children(scope) {
            self.copy_into(child, &mut out, Self::ROOT, prefix, suffix);
        }
        out
    }

    fn copy_into(
        &self,
        src: EntryId,
        dest: &mut Tree,
        dest_scope: EntryId,
        prefix: &str,
        suffix: &str,
    ) {
        let entry = &self.arena[src.0];
        let seq = format!("{prefix}{}{suffix}", entry.seq);
        let new_id = dest.append(dest_scope, entry.name.clone(), entry.value.clone(), seq);
        for &child in &entry.children {
            self.copy_into(child, dest, new_id, prefix, suffix);
        }
    }

    /// Append copies of `src_scope`'s children (from another tree) under
    /// `scope`, seqs rewritten with `prefix`; at most one top-level child
    /// named `drop_named` is skipped
    pub fn extend_from(
        &mut self,
        scope: EntryId,
        src: &Tree,
        src_scope: EntryId,
        prefix: &str,
        drop_named: Option<&str>,
    ) {
        let mut dropped = false;
        for &top in src.children(src_scope) {
            if let Some(skip) = drop_named {
                if !dropped && src.arena[top.0].name == skip {
                    dropped = true;
                    continue;
                }
            }
            self.graft(src, top, scope, prefix);
        }
    }

    fn graft(&mut self, src: &Tree, src_id: EntryId, dest_scope: EntryId, prefix: &str) {
        let entry = &src.arena[src_id.0];
        let seq = format!("{prefix}{}", entry.seq);
        let new_id = self.append(dest_scope, entry.name.clone(), entry.value.clone(), seq);
        for &child in &entry.children {
            self.graft(src, child, new_id, prefix);
        }
    }

    /// Replace `dest`'s name, value, and subtree with a copy of `src_id`
    /// from another tree; `dest` keeps its own seq, copied descendants get
    /// `prefix + original`
    pub fn replace_with_copy(&mut self, dest: EntryId, src: &Tree, src_id: EntryId, prefix: &str) {
        let old_children = std::mem::take(&mut self.arena[dest.0].children);
        for child in old_children {
            self.tombstone(child);
        }
        self.arena[dest.0].name = src.arena[src_id.0].name.clone();
        self.arena[dest.0].value = src.arena[src_id.0].value.clone();
        for &child in src.children(src_id) {
            self.graft(src, child, dest, prefix);
        }
    }
}
