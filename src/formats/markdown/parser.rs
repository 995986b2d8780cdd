//! Markdown parsing (Markdown → document tree)
//!
//! Pipeline: Markdown string → Comrak AST → document tree.
//!
//! Every call parses the whole input from scratch. There is no cache and no state carried from
//! one call to the next, which is what lets the stream assembler re-parse its buffer on every
//! chunk and still converge on the same tree a one-shot parse would give.

use crate::ast::{
    Alignment, Block, BlockQuote, Chart, CodeBlock, Document, Image, Inline, Link, List,
    ListItem, Table, TableCell,
};
use crate::ast::inline::plain_text;
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};
use serde_json::Value;

/// Info strings that mark a fenced block as a chart, compared trimmed and lowercased
pub const CHART_TAGS: [&str; 2] = ["chart", "echarts"];

/// Per-call parser switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// When false, chart fences are ordinary code blocks
    pub chart_enabled: bool,
    /// Produce live charts (true) or pending charts (false)
    pub chart_as_live_widget: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::live()
    }
}

impl ParseOptions {
    pub fn live() -> Self {
        ParseOptions {
            chart_enabled: true,
            chart_as_live_widget: true,
        }
    }

    pub fn pending() -> Self {
        ParseOptions {
            chart_enabled: true,
            chart_as_live_widget: false,
        }
    }

    pub fn with_charts(mut self, enabled: bool) -> Self {
        self.chart_enabled = enabled;
        self
    }
}

/// Parse a Markdown buffer into a document tree. Never fails.
pub fn parse_markdown(text: &str, options: &ParseOptions) -> Document {
    let arena = Arena::new();
    let root = parse_document(&arena, text, &default_comrak_options());
    Document::new(convert_children(root, options))
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

fn convert_children<'a>(node: &'a AstNode<'a>, options: &ParseOptions) -> Vec<Block> {
    let mut blocks = Vec::new();
    for child in node.children() {
        convert_block(child, options, &mut blocks);
    }
    blocks
}

fn convert_block<'a>(node: &'a AstNode<'a>, options: &ParseOptions, out: &mut Vec<Block>) {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Paragraph => out.push(Block::paragraph(convert_inlines(node))),

        NodeValue::Heading(heading) => out.push(Block::heading(heading.level, convert_inlines(node))),

        NodeValue::List(list) => {
            let items = node.children().map(|item| convert_item(item, options)).collect();
            out.push(Block::List(List {
                ordered: matches!(list.list_type, ListType::Ordered),
                start: list.start,
                tight: list.tight,
                items,
            }));
        }

        NodeValue::CodeBlock(code) => out.push(convert_code_block(&code.info, &code.literal, options)),

        NodeValue::Table(table) => out.push(convert_table(node, &table.alignments)),

        NodeValue::BlockQuote => out.push(Block::BlockQuote(BlockQuote {
            children: convert_children(node, options),
        })),

        NodeValue::ThematicBreak => out.push(Block::Rule),

        NodeValue::HtmlBlock(html) => out.push(Block::Html(html.literal.clone())),

        // Containers we don't model (footnotes, front matter...) contribute their children
        _ => out.extend(convert_children(node, options)),
    }
}

fn convert_item<'a>(node: &'a AstNode<'a>, options: &ParseOptions) -> ListItem {
    let task = match &node.data.borrow().value {
        NodeValue::TaskItem(symbol) => Some(symbol.map(|c| !c.is_whitespace()).unwrap_or(false)),
        _ => None,
    };
    ListItem {
        task,
        children: convert_children(node, options),
    }
}

/// A fenced block becomes a chart only if its tag matches and its body is JSON
fn convert_code_block(info: &str, literal: &str, options: &ParseOptions) -> Block {
    let tag = info.trim().to_lowercase();
    if CHART_TAGS.contains(&tag.as_str()) {
        match serde_json::from_str::<Value>(literal.trim()) {
            Ok(config) if options.chart_enabled => {
                let chart = if options.chart_as_live_widget {
                    Chart::live(&config)
                } else {
                    Chart::pending(&config)
                };
                return Block::Chart(chart);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(tag = %tag, error = %e, "chart body is not JSON, keeping it as code")
            }
        }
    }

    Block::CodeBlock(CodeBlock {
        language: info.split_whitespace().next().map(str::to_string),
        literal: literal.to_string(),
    })
}

fn convert_table<'a>(node: &'a AstNode<'a>, alignments: &[TableAlignment]) -> Block {
    let mut header = Vec::new();
    let mut rows = Vec::new();
    for row in node.children() {
        let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
        let cells: Vec<TableCell> = row
            .children()
            .map(|cell| TableCell {
                content: convert_inlines(cell),
            })
            .collect();
        if is_header && header.is_empty() {
            header = cells;
        } else {
            rows.push(cells);
        }
    }

    Block::Table(Table {
        alignments: alignments.iter().map(convert_alignment).collect(),
        header,
        rows,
    })
}

fn convert_alignment(alignment: &TableAlignment) -> Alignment {
    match alignment {
        TableAlignment::None => Alignment::None,
        TableAlignment::Left => Alignment::Left,
        TableAlignment::Center => Alignment::Center,
        TableAlignment::Right => Alignment::Right,
    }
}

fn convert_inlines<'a>(node: &'a AstNode<'a>) -> Vec<Inline> {
    let mut out = Vec::new();
    for child in node.children() {
        push_inline(child, &mut out);
    }
    out
}

fn push_inline<'a>(node: &'a AstNode<'a>, out: &mut Vec<Inline>) {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Text(text) => push_text(out, text),
        // A single newline inside a paragraph is kept as a visible break
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(Inline::LineBreak),
        NodeValue::Code(code) => out.push(Inline::Code(code.literal.clone())),
        NodeValue::Emph => out.push(Inline::Emphasis(convert_inlines(node))),
        NodeValue::Strong => out.push(Inline::Strong(convert_inlines(node))),
        NodeValue::Strikethrough => out.push(Inline::Strikethrough(convert_inlines(node))),
        NodeValue::Link(link) => out.push(Inline::Link(Link {
            url: link.url.clone(),
            title: link.title.clone(),
            content: convert_inlines(node),
        })),
        NodeValue::Image(link) => out.push(Inline::Image(Image {
            url: link.url.clone(),
            title: link.title.clone(),
            alt: plain_text(&convert_inlines(node)),
        })),
        NodeValue::HtmlInline(html) => out.push(Inline::Html(html.clone())),
        _ => {
            for child in node.children() {
                push_inline(child, out);
            }
        }
    }
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text(previous)) = out.last_mut() {
        previous.push_str(text);
    } else {
        out.push(Inline::text(text));
    }
}
