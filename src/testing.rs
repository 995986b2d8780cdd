//! Testing utilities
//!
//!     Tools shared by the unit tests, the integration tests and any host that wants to check
//!     what the conversion core produced.
//!
//! Rules
//!
//!     Markdown looks easy to write by hand, and hand-written test strings drift: a missing
//!     blank line turns a chart fence into part of a list item and the test quietly asserts the
//!     wrong thing. Two habits keep tests honest:
//!
//!         1. Prefer the curated documents in `fixtures/` (via [`Fixtures`]) for anything
//!            larger than a line or two.
//!         2. Assert on the tree with [`assert_doc`] rather than on `Debug` output, so tests
//!            survive changes to fields they don't care about.
//!
//!     ```rust,ignore
//!     use streamdoc::testing::{assert_doc, Fixtures};
//!
//!     let doc = Fixtures::load("charts-sample").parse_live();
//!     assert_doc(&doc)
//!         .block(0, |b| { b.assert_heading().level(1); })
//!         .chart_count(3);
//!     ```
//!
//!     For mounting and export tests use [`engine::StubEngine`]; it records every mount and can
//!     be told which raster source to offer, so the snapshot/surface/placeholder branches of the
//!     serializer can each be reached deterministically.

pub mod assertions;
pub mod engine;
pub mod fixtures;
pub mod matchers;

pub use assertions::{
    BlockAssertion, ChartAssertion, CodeAssertion, DocumentAssertion, HeadingAssertion,
    ListAssertion, ParagraphAssertion,
};
pub use fixtures::Fixtures;
pub use matchers::TextMatch;

use crate::ast::Document;

/// Create an assertion builder for a document
pub fn assert_doc(doc: &Document) -> DocumentAssertion<'_> {
    DocumentAssertion { doc }
}
