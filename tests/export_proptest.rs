//! Property-based tests for the Markdown export
//!
//! A document parsed from Markdown, serialized to markup and exported back to Markdown must parse
//! to the same tree. The generated text leans on backslash escapes so every ASCII punctuation
//! character shows up as literal text somewhere.

use proptest::prelude::*;
use streamdoc::ast::Document;
use streamdoc::formats::html::serializer::{serialize_markup, MarkupOptions};
use streamdoc::formats::markdown::parser::{parse_markdown, ParseOptions};
use streamdoc::formats::markdown::to_portable_text;

// `:` and `@` are left out so the autolink extension never fires
const PUNCTUATION: &str = "!\"#$%&'()*+,-./;<=>?[\\]^_`{|}~";

fn parse(source: &str) -> Document {
    parse_markdown(source, &ParseOptions::live())
}

/// A word of letters, digits and escaped punctuation
fn word() -> impl Strategy<Value = String> {
    let escaped: Vec<String> = PUNCTUATION.chars().map(|c| format!("\\{}", c)).collect();
    let piece = prop_oneof![
        3 => "[a-v0-9]{1,3}",
        2 => prop::sample::select(escaped),
    ];
    prop::collection::vec(piece, 1..5).prop_map(|pieces| pieces.concat())
}

fn inline() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => word(),
        1 => word().prop_map(|w| format!("*{}*", w)),
        1 => word().prop_map(|w| format!("**{}**", w)),
        1 => word().prop_map(|w| format!("~~{}~~", w)),
        1 => "[a-v0-9]{1,6}".prop_map(|c| format!("`{}`", c)),
        1 => (word(), "[a-v0-9]{1,5}").prop_map(|(w, url)| format!("[{}]({})", w, url)),
    ]
}

fn line() -> impl Strategy<Value = String> {
    prop::collection::vec(inline(), 1..5).prop_map(|parts| parts.join(" "))
}

fn block() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => line(),
        1 => (line(), line()).prop_map(|(a, b)| format!("{}\n{}", a, b)),
        1 => (1..=6usize, line()).prop_map(|(level, text)| format!("{} {}", "#".repeat(level), text)),
        1 => prop::collection::vec(line(), 1..4).prop_map(|items| {
            items
                .iter()
                .map(|item| format!("- {}", item))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        1 => line().prop_map(|text| format!("> {}", text)),
    ]
}

fn markdown() -> impl Strategy<Value = String> {
    prop::collection::vec(block(), 1..5).prop_map(|blocks| blocks.join("\n\n"))
}

proptest! {
    #[test]
    fn test_export_reparses_to_same_tree(source in markdown()) {
        let original = parse(&source);
        let markup = serialize_markup(&original, &MarkupOptions::default());
        let exported = to_portable_text(&markup);
        prop_assert_eq!(parse(&exported), original, "exported:\n{}", exported);
    }

    #[test]
    fn test_export_is_a_fixed_point(source in markdown()) {
        let once = to_portable_text(&serialize_markup(&parse(&source), &MarkupOptions::default()));
        let twice = to_portable_text(&serialize_markup(&parse(&once), &MarkupOptions::default()));
        prop_assert_eq!(twice, once);
    }
}
