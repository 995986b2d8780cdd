//! Fluent assertions over the document tree

use super::matchers::TextMatch;
use crate::ast::inline::plain_text;
use crate::ast::{AstNode, Block, Chart, CodeBlock, Document, Heading, List, Paragraph};
use serde_json::Value;

fn summarize(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| b.node_type())
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct DocumentAssertion<'a> {
    pub(crate) doc: &'a Document,
}

impl<'a> DocumentAssertion<'a> {
    /// Assert the number of top-level blocks
    pub fn block_count(self, expected: usize) -> Self {
        let actual = self.doc.blocks.len();
        assert_eq!(
            actual,
            expected,
            "Expected {} blocks, found {} blocks: [{}]",
            expected,
            actual,
            summarize(&self.doc.blocks)
        );
        self
    }

    /// Assert on a top-level block by index
    pub fn block<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(BlockAssertion<'a>),
    {
        assert!(
            index < self.doc.blocks.len(),
            "Block index {} out of bounds (document has {} blocks: [{}])",
            index,
            self.doc.blocks.len(),
            summarize(&self.doc.blocks)
        );
        assertion(BlockAssertion {
            block: &self.doc.blocks[index],
            context: format!("blocks[{}]", index),
        });
        self
    }

    /// Assert the number of charts anywhere in the tree
    pub fn chart_count(self, expected: usize) -> Self {
        let actual = self.doc.charts().len();
        assert_eq!(actual, expected, "Expected {} charts, found {}", expected, actual);
        self
    }

    /// Assert on a chart by its position in document order
    pub fn chart<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ChartAssertion<'a>),
    {
        let charts = self.doc.charts();
        assert!(
            index < charts.len(),
            "Chart index {} out of bounds (document has {} charts)",
            index,
            charts.len()
        );
        assertion(ChartAssertion {
            chart: charts[index],
            context: format!("charts[{}]", index),
        });
        self
    }

    pub fn all_charts_mounted(self) -> Self {
        for (index, chart) in self.doc.charts().iter().enumerate() {
            assert!(
                chart.rendering().is_some(),
                "charts[{}]: Expected a mounted chart, found {}",
                index,
                chart.display_label()
            );
        }
        self
    }
}

pub struct BlockAssertion<'a> {
    pub(crate) block: &'a Block,
    pub(crate) context: String,
}

impl<'a> BlockAssertion<'a> {
    fn mismatch(&self, expected: &str) -> ! {
        panic!(
            "{}: Expected {}, found {}",
            self.context,
            expected,
            self.block.node_type()
        )
    }

    pub fn assert_paragraph(self) -> ParagraphAssertion<'a> {
        match self.block {
            Block::Paragraph(p) => ParagraphAssertion {
                para: p,
                context: self.context,
            },
            _ => self.mismatch("Paragraph"),
        }
    }

    pub fn assert_heading(self) -> HeadingAssertion<'a> {
        match self.block {
            Block::Heading(h) => HeadingAssertion {
                heading: h,
                context: self.context,
            },
            _ => self.mismatch("Heading"),
        }
    }

    pub fn assert_code(self) -> CodeAssertion<'a> {
        match self.block {
            Block::CodeBlock(c) => CodeAssertion {
                code: c,
                context: self.context,
            },
            _ => self.mismatch("CodeBlock"),
        }
    }

    pub fn assert_chart(self) -> ChartAssertion<'a> {
        match self.block {
            Block::Chart(c) => ChartAssertion {
                chart: c,
                context: self.context,
            },
            _ => self.mismatch("Chart"),
        }
    }

    pub fn assert_list(self) -> ListAssertion<'a> {
        match self.block {
            Block::List(l) => ListAssertion {
                list: l,
                context: self.context,
            },
            _ => self.mismatch("List"),
        }
    }

    pub fn assert_rule(self) {
        if !matches!(self.block, Block::Rule) {
            self.mismatch("Rule")
        }
    }
}

pub struct ParagraphAssertion<'a> {
    pub(crate) para: &'a Paragraph,
    pub(crate) context: String,
}

impl<'a> ParagraphAssertion<'a> {
    pub fn text(self, expected: &str) -> Self {
        TextMatch::Exact(expected.to_string()).assert(&plain_text(&self.para.content), &self.context);
        self
    }

    pub fn text_contains(self, substring: &str) -> Self {
        TextMatch::Contains(substring.to_string())
            .assert(&plain_text(&self.para.content), &self.context);
        self
    }
}

pub struct HeadingAssertion<'a> {
    pub(crate) heading: &'a Heading,
    pub(crate) context: String,
}

impl<'a> HeadingAssertion<'a> {
    pub fn level(self, expected: u8) -> Self {
        assert_eq!(
            self.heading.level, expected,
            "{}: Expected heading level {}, found {}",
            self.context, expected, self.heading.level
        );
        self
    }

    pub fn text(self, expected: &str) -> Self {
        TextMatch::Exact(expected.to_string())
            .assert(&plain_text(&self.heading.content), &self.context);
        self
    }
}

pub struct CodeAssertion<'a> {
    pub(crate) code: &'a CodeBlock,
    pub(crate) context: String,
}

impl<'a> CodeAssertion<'a> {
    pub fn language(self, expected: &str) -> Self {
        assert_eq!(
            self.code.language.as_deref(),
            Some(expected),
            "{}: Expected code language '{}'",
            self.context,
            expected
        );
        self
    }

    pub fn literal(self, expected: &str) -> Self {
        TextMatch::Exact(expected.to_string()).assert(&self.code.literal, &self.context);
        self
    }
}

pub struct ChartAssertion<'a> {
    pub(crate) chart: &'a Chart,
    pub(crate) context: String,
}

impl<'a> ChartAssertion<'a> {
    pub fn is_pending(self) -> Self {
        assert!(
            self.chart.is_pending(),
            "{}: Expected a pending chart, found {}",
            self.context,
            self.chart.display_label()
        );
        self
    }

    pub fn is_live(self) -> Self {
        assert!(
            self.chart.is_live(),
            "{}: Expected a live chart, found {}",
            self.context,
            self.chart.display_label()
        );
        self
    }

    pub fn mounted(self) -> Self {
        assert!(
            self.chart.rendering().is_some(),
            "{}: Expected a mounted chart, found {}",
            self.context,
            self.chart.display_label()
        );
        self
    }

    pub fn unmounted(self) -> Self {
        assert!(
            self.chart.rendering().is_none(),
            "{}: Expected an unmounted chart, found {}",
            self.context,
            self.chart.display_label()
        );
        self
    }

    /// Assert the decoded configuration equals `expected`
    pub fn config(self, expected: Value) -> Self {
        match self.chart.decode() {
            Ok(actual) => assert_eq!(
                actual, expected,
                "{}: Chart configuration mismatch",
                self.context
            ),
            Err(e) => panic!("{}: Chart payload does not decode: {}", self.context, e),
        }
        self
    }
}

pub struct ListAssertion<'a> {
    pub(crate) list: &'a List,
    pub(crate) context: String,
}

impl<'a> ListAssertion<'a> {
    pub fn ordered(self, expected: bool) -> Self {
        assert_eq!(
            self.list.ordered, expected,
            "{}: Expected ordered = {}",
            self.context, expected
        );
        self
    }

    pub fn item_count(self, expected: usize) -> Self {
        let actual = self.list.items.len();
        assert_eq!(
            actual, expected,
            "{}: Expected {} list items, found {}",
            self.context, expected, actual
        );
        self
    }

    /// Assert on a block inside a list item
    pub fn item_block<F>(self, item: usize, index: usize, assertion: F) -> Self
    where
        F: FnOnce(BlockAssertion<'a>),
    {
        let children = &self.list.items[item].children;
        assert!(
            index < children.len(),
            "{}: items[{}] has {} blocks: [{}]",
            self.context,
            item,
            children.len(),
            summarize(children)
        );
        assertion(BlockAssertion {
            block: &children[index],
            context: format!("{}.items[{}][{}]", self.context, item, index),
        });
        self
    }
}
