//! Tree builder
//!
//! Assembles scanned lines into an entry tree. One insertion pointer is
//! kept per indent level: ascending only lowers the current level (deeper
//! pointers are deliberately left in place, never cleared), descending one
//! level points the new level at the children of the last-appended entry.
//! A deeper jump is an error in strict mode and is clamped to one level
//! otherwise.
//!
//! Entry ids are `prefix + line-number`, line numbers 0-based.

use thiserror::Error;

use super::ParseOptions;
use crate::mards::diagnostics::{Diagnostic, Location, Origin};
use crate::mards::lexing::{scan_line, TabStops};
use crate::mards::node::{EntryId, Tree};

/// A structural problem found while assembling the tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("tab stop jumped ahead too far")]
    IndentJump,
}

/// Build an entry tree from text; diagnostics carry the given origin
pub fn build(text: &str, options: &ParseOptions, origin: Origin) -> (Tree, Vec<Diagnostic>) {
    let mut tree = Tree::new();
    let mut diagnostics = Vec::new();
    let mut tabs = TabStops::new();
    let mut pointers: Vec<EntryId> = vec![Tree::ROOT];
    let mut current: usize = 0;
    let mut last_spot = Tree::ROOT;

    for (ctr, line) in text.split('\n').enumerate() {
        let scanned = scan_line(line, &mut tabs, options.strict, options.key_open);
        if let Some(error) = scanned.error {
            diagnostics.push(Diagnostic::error(
                origin,
                Location::Line(ctr),
                error.to_string(),
            ));
            continue;
        }
        let (Some(mut indent), Some(key)) = (scanned.indent, scanned.key) else {
            continue;
        };
        if indent < current {
            current = indent;
        } else if indent > current {
            if indent > current + 1 {
                if options.strict {
                    diagnostics.push(Diagnostic::error(
                        origin,
                        Location::Line(ctr),
                        BuildError::IndentJump.to_string(),
                    ));
                    break;
                }
                indent = current + 1;
            }
            set_pointer(&mut pointers, indent, last_spot);
            current = indent;
        }
        let seq = format!("{}{}", options.prefix, ctr);
        last_spot = tree.append(pointers[indent], key, scanned.value, seq);
    }

    (tree, diagnostics)
}

fn set_pointer(pointers: &mut Vec<EntryId>, level: usize, target: EntryId) {
    if level == pointers.len() {
        pointers.push(target);
    } else {
        pointers[level] = target;
    }
}
