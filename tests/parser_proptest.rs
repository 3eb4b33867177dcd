//! Property-based tests for parsing and rendering
//!
//! Adaptive parsing must accept any input without reporting, and a rendered
//! tree must re-parse to the same names and values.

use proptest::prelude::*;

use mards::mards::{parse_document, render, ParseOptions, QuoteStyle, Tree};

/// Generate entry names the way documents usually spell them
fn entry_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

/// Generate values, including awkward ones with padding and quote marks
fn entry_value_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        "[a-zA-Z0-9]{1,12}".prop_map(Some),
        "[a-zA-Z0-9][a-zA-Z0-9 ]{0,10}[a-zA-Z0-9]".prop_map(Some),
        "[a-z'\" ]{0,10}".prop_map(Some),
    ]
}

/// Build a two-level tree from generated names and values
fn tree_strategy() -> impl Strategy<Value = Tree> {
    prop::collection::vec(
        (
            entry_name_strategy(),
            entry_value_strategy(),
            prop::collection::vec((entry_name_strategy(), entry_value_strategy()), 0..3),
        ),
        0..6,
    )
    .prop_map(|tops| {
        let mut tree = Tree::new();
        let mut line = 0;
        for (name, value, kids) in tops {
            let top = tree.append(Tree::ROOT, name, value, line.to_string());
            line += 1;
            for (kid_name, kid_value) in kids {
                tree.append(top, kid_name, kid_value, line.to_string());
                line += 1;
            }
        }
        tree
    })
}

/// Generate loose document text: comments, blanks, padding, stray quotes
fn document_soup_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-zA-Z0-9_]{1,8}",
            "[ \t]{0,6}[a-zA-Z0-9_]{1,8} [a-zA-Z0-9'\" ]{0,12}",
            "#[a-zA-Z0-9 ]{0,12}",
            "[ \t]{0,4}",
            Just(String::new()),
        ],
        0..12,
    )
    .prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn test_adaptive_parse_never_reports(input in document_soup_strategy()) {
        let (_, diagnostics) = parse_document(&input, &ParseOptions::default());
        prop_assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_adaptive_parse_survives_noise(input in "[ -~\t\n]{0,200}") {
        let (_, diagnostics) = parse_document(&input, &ParseOptions::default());
        prop_assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_rendered_trees_reparse_to_the_same_shape(tree in tree_strategy()) {
        for style in [QuoteStyle::Always, QuoteStyle::ByNeed] {
            let text = render(&tree, style);
            let (reparsed, diagnostics) = parse_document(&text, &ParseOptions::default());
            prop_assert!(diagnostics.is_empty());
            prop_assert_eq!(
                render(&reparsed, QuoteStyle::Always),
                render(&tree, QuoteStyle::Always)
            );
        }
    }

    #[test]
    fn test_strict_mode_accepts_rendered_output(tree in tree_strategy()) {
        let text = render(&tree, QuoteStyle::Always);
        let options = ParseOptions {
            strict: true,
            ..ParseOptions::default()
        };
        let (_, diagnostics) = parse_document(&text, &options);
        prop_assert!(diagnostics.is_empty());
    }
}
