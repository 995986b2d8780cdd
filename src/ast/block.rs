//! Block-level nodes

use super::chart::Chart;
use super::inline::{plain_text, Inline};
use super::traits::AstNode;

/// A block in the document forest
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Heading(Heading),
    List(List),
    Table(Table),
    CodeBlock(CodeBlock),
    Chart(Chart),
    BlockQuote(BlockQuote),
    Rule,
    /// Raw block markup, passed through untouched
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// 1 through 6
    pub level: u8,
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    /// First number of an ordered list
    pub start: usize,
    /// Tight lists render their item paragraphs without `<p>` wrappers
    pub tight: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    /// `Some(checked)` for task list items
    pub task: Option<bool>,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub header: Vec<TableCell>,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockQuote {
    pub children: Vec<Block>,
}

impl Block {
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph(Paragraph { content })
    }

    pub fn heading(level: u8, content: Vec<Inline>) -> Self {
        Block::Heading(Heading { level, content })
    }

    pub fn code(language: Option<&str>, literal: impl Into<String>) -> Self {
        Block::CodeBlock(CodeBlock {
            language: language.map(str::to_string),
            literal: literal.into(),
        })
    }

    /// Inline runs held directly by this block (table cells count as separate runs)
    pub fn inline_groups(&self) -> Vec<&[Inline]> {
        match self {
            Block::Paragraph(p) => vec![&p.content],
            Block::Heading(h) => vec![&h.content],
            Block::Table(t) => t
                .header
                .iter()
                .chain(t.rows.iter().flatten())
                .map(|cell| cell.content.as_slice())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Nested block sequences (one per list item, or the quoted blocks)
    pub fn child_groups(&self) -> Vec<&[Block]> {
        match self {
            Block::List(list) => list.items.iter().map(|i| i.children.as_slice()).collect(),
            Block::BlockQuote(q) => vec![&q.children],
            _ => Vec::new(),
        }
    }

    pub(crate) fn child_groups_mut(&mut self) -> Vec<&mut Vec<Block>> {
        match self {
            Block::List(list) => list.items.iter_mut().map(|i| &mut i.children).collect(),
            Block::BlockQuote(q) => vec![&mut q.children],
            _ => Vec::new(),
        }
    }
}

impl AstNode for Block {
    fn node_type(&self) -> &'static str {
        match self {
            Block::Paragraph(_) => "Paragraph",
            Block::Heading(_) => "Heading",
            Block::List(_) => "List",
            Block::Table(_) => "Table",
            Block::CodeBlock(_) => "CodeBlock",
            Block::Chart(_) => "Chart",
            Block::BlockQuote(_) => "BlockQuote",
            Block::Rule => "Rule",
            Block::Html(_) => "Html",
        }
    }

    fn display_label(&self) -> String {
        match self {
            Block::Paragraph(p) => plain_text(&p.content),
            Block::Heading(h) => format!("h{} {}", h.level, plain_text(&h.content)),
            Block::List(l) => {
                let kind = if l.ordered { "ordered" } else { "bullet" };
                format!("{} ({} items)", kind, l.items.len())
            }
            Block::Table(t) => format!("{}x{}", t.rows.len() + 1, t.header.len()),
            Block::CodeBlock(c) => c.language.clone().unwrap_or_default(),
            Block::Chart(chart) => chart.display_label(),
            Block::BlockQuote(q) => format!("{} blocks", q.children.len()),
            Block::Rule => String::new(),
            Block::Html(html) => html.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_groups_cover_list_items() {
        let list = Block::List(List {
            ordered: false,
            start: 1,
            tight: true,
            items: vec![
                ListItem {
                    task: None,
                    children: vec![Block::paragraph(vec![Inline::text("a")])],
                },
                ListItem {
                    task: Some(true),
                    children: vec![Block::paragraph(vec![Inline::text("b")])],
                },
            ],
        });
        assert_eq!(list.child_groups().len(), 2);
        assert_eq!(list.display_label(), "bullet (2 items)");
    }

    #[test]
    fn test_table_inline_groups_include_header() {
        let table = Block::Table(Table {
            alignments: vec![Alignment::None, Alignment::Right],
            header: vec![
                TableCell {
                    content: vec![Inline::text("a")],
                },
                TableCell {
                    content: vec![Inline::text("b")],
                },
            ],
            rows: vec![vec![TableCell::default(), TableCell::default()]],
        });
        assert_eq!(table.inline_groups().len(), 4);
        assert_eq!(Alignment::Right.as_attr(), Some("right"));
    }
}
