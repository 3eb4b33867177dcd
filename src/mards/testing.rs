//! Testing utilities
//!
//! Fluent assertion builders over entry trees and diagnostic lists, used
//! across the crate's unit and integration tests. Each builder consumes and
//! returns itself so checks chain, and every failure message carries the
//! path that was being asserted.

use crate::mards::diagnostics::Diagnostic;
use crate::mards::node::{EntryId, Tree};

// ============================================================================
// Entry Points
// ============================================================================

/// Create an assertion builder rooted at the top level of a tree
pub fn assert_tree(tree: &Tree) -> EntryAssertion<'_> {
    EntryAssertion {
        tree,
        id: Tree::ROOT,
        context: "root".to_string(),
    }
}

/// Create an assertion builder over a diagnostic list
pub fn assert_diagnostics(diagnostics: &[Diagnostic]) -> DiagnosticsAssertion<'_> {
    DiagnosticsAssertion { diagnostics }
}

// ============================================================================
// Tree Assertions
// ============================================================================

pub struct EntryAssertion<'a> {
    tree: &'a Tree,
    id: EntryId,
    context: String,
}

impl<'a> EntryAssertion<'a> {
    /// Assert the entry's name
    pub fn name(self, expected: &str) -> Self {
        let actual = self.tree.name(self.id);
        assert_eq!(
            actual, expected,
            "Expected name '{}' at {}, found '{}'",
            expected, self.context, actual
        );
        self
    }

    /// Assert the entry's value
    pub fn value(self, expected: &str) -> Self {
        let actual = self.tree.value(self.id);
        assert_eq!(
            actual,
            Some(expected),
            "Expected value '{}' at {}, found {:?}",
            expected,
            self.context,
            actual
        );
        self
    }

    /// Assert the entry carries no value
    pub fn no_value(self) -> Self {
        let actual = self.tree.value(self.id);
        assert_eq!(
            actual, None,
            "Expected no value at {}, found {:?}",
            self.context, actual
        );
        self
    }

    /// Assert the entry's structural id
    pub fn seq(self, expected: &str) -> Self {
        let actual = self.tree.seq(self.id);
        assert_eq!(
            actual, expected,
            "Expected seq '{}' at {}, found '{}'",
            expected, self.context, actual
        );
        self
    }

    /// Assert the number of children
    pub fn count(self, expected: usize) -> Self {
        let actual = self.tree.children(self.id).len();
        assert_eq!(
            actual,
            expected,
            "Expected {} entries under {}, found {}: [{}]",
            expected,
            self.context,
            actual,
            summarize_entries(self.tree, self.tree.children(self.id))
        );
        self
    }

    /// Assert there is no child with the given name
    pub fn without(self, name: &str) -> Self {
        assert!(
            self.tree.find(self.id, name).is_none(),
            "Expected no entry named '{}' under {}",
            name,
            self.context
        );
        self
    }

    /// Assert on the child at a sibling position
    pub fn entry<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(EntryAssertion<'a>),
    {
        let children = self.tree.children(self.id);
        assert!(
            index < children.len(),
            "Entry index {} out of bounds under {} ({} entries)",
            index,
            self.context,
            children.len()
        );
        assertion(EntryAssertion {
            tree: self.tree,
            id: children[index],
            context: format!("{}[{}]", self.context, index),
        });
        self
    }

    /// Assert a child with the given name exists and descend into it
    pub fn child<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(EntryAssertion<'a>),
    {
        let Some(id) = self.tree.find(self.id, name) else {
            panic!(
                "No entry named '{}' under {}: [{}]",
                name,
                self.context,
                summarize_entries(self.tree, self.tree.children(self.id))
            );
        };
        assertion(EntryAssertion {
            tree: self.tree,
            id,
            context: format!("{}.{}", self.context, name),
        });
        self
    }
}

// ============================================================================
// Diagnostic Assertions
// ============================================================================

pub struct DiagnosticsAssertion<'a> {
    diagnostics: &'a [Diagnostic],
}

impl<'a> DiagnosticsAssertion<'a> {
    /// Assert no diagnostics at all were reported
    pub fn clean(self) -> Self {
        assert!(
            self.diagnostics.is_empty(),
            "Expected no diagnostics, found: [{}]",
            summarize_diagnostics(self.diagnostics)
        );
        self
    }

    /// Assert the total number of diagnostics
    pub fn count(self, expected: usize) -> Self {
        let actual = self.diagnostics.len();
        assert_eq!(
            actual,
            expected,
            "Expected {} diagnostics, found {}: [{}]",
            expected,
            actual,
            summarize_diagnostics(self.diagnostics)
        );
        self
    }

    /// Assert the number of error-severity diagnostics
    pub fn error_count(self, expected: usize) -> Self {
        let actual = self.diagnostics.iter().filter(|d| d.is_error()).count();
        assert_eq!(
            actual,
            expected,
            "Expected {} errors, found {}: [{}]",
            expected,
            actual,
            summarize_diagnostics(self.diagnostics)
        );
        self
    }

    /// Assert some diagnostic's message contains the fragment
    pub fn includes(self, fragment: &str) -> Self {
        assert!(
            self.diagnostics.iter().any(|d| d.message.contains(fragment)),
            "Expected a diagnostic containing '{}', found: [{}]",
            fragment,
            summarize_diagnostics(self.diagnostics)
        );
        self
    }

    /// Assert the exact message at a position
    pub fn nth_message(self, index: usize, expected: &str) -> Self {
        assert!(
            index < self.diagnostics.len(),
            "Diagnostic index {} out of bounds ({} diagnostics)",
            index,
            self.diagnostics.len()
        );
        assert_eq!(
            self.diagnostics[index].message, expected,
            "Unexpected message at index {}",
            index
        );
        self
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn summarize_entries(tree: &Tree, ids: &[EntryId]) -> String {
    ids.iter()
        .map(|&id| tree.name(id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn summarize_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Tests for Assertions
// ============================================================================
