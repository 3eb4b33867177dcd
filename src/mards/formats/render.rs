//! Text rendering
//!
//! Writes a tree back out as `key value` lines indented four spaces per
//! level. [`QuoteStyle`] picks how values are quoted; `ByNeed` quotes
//! exactly the values an unquoted re-parse would alter.

use std::fmt;

use crate::mards::node::{EntryId, Tree};

/// Value quoting policy for [`render`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Wrap every value in double quotes
    Always,
    /// Quote only values that would not survive an unquoted re-parse
    #[default]
    ByNeed,
    /// Emit every value verbatim
    Never,
}

/// Render the whole tree as MARDS text
pub fn render(tree: &Tree, quote_style: QuoteStyle) -> String {
    let mut out = String::new();
    render_scope(tree, Tree::ROOT, 0, quote_style, &mut out);
    out
}

fn render_scope(
    tree: &Tree,
    scope: EntryId,
    depth: usize,
    quote_style: QuoteStyle,
    out: &mut String,
) {
    for &child in tree.children(scope) {
        for _ in 0..depth {
            out.push_str("    ");
        }
        out.push_str(tree.name(child));
        if let Some(value) = tree.value(child) {
            out.push(' ');
            let quote = match quote_style {
                QuoteStyle::Always => true,
                QuoteStyle::ByNeed => needs_quotes(value),
                QuoteStyle::Never => false,
            };
            if quote {
                out.push('"');
                out.push_str(value);
                out.push('"');
            } else {
                out.push_str(value);
            }
        }
        out.push('\n');
        render_scope(tree, child, depth + 1, quote_style, out);
    }
}

/// True when a bare re-parse would trim the text, read it as absent, or
/// strip a quote pair from it
fn needs_quotes(value: &str) -> bool {
    if value.is_empty() || value.trim() != value {
        return true;
    }
    let bytes = value.as_bytes();
    bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, QuoteStyle::Always))
    }
}
