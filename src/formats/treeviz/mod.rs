//! Tree visualization
//!
//! An indented dump of the document tree, one node per line, for debugging parses:
//!
//! ```text
//! ⧉ Document
//!   # h1 Title
//!   ¶ Some text
//!   ◔ Chart live
//! ```

use crate::ast::traits::walk_blocks;
use crate::ast::{AstNode, Block, Document, Visitor};
use crate::error::FormatError;
use crate::format::Format;

fn icon(node_type: &str) -> &'static str {
    match node_type {
        "Paragraph" => "¶",
        "Heading" => "#",
        "List" => "☰",
        "Table" => "▦",
        "CodeBlock" => "𝒱",
        "Chart" => "◔",
        "BlockQuote" => "❝",
        "Rule" => "—",
        "Html" => "<>",
        _ => "○",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

struct TreeWriter {
    lines: Vec<String>,
}

impl Visitor for TreeWriter {
    fn visit_block(&mut self, block: &Block, depth: usize) {
        let label = truncate(&block.display_label().replace('\n', "↵"), 50);
        self.lines.push(
            format!(
                "{}{} {} {}",
                "  ".repeat(depth + 1),
                icon(block.node_type()),
                block.node_type(),
                label
            )
            .trim_end()
            .to_string(),
        );
    }
}

/// Render a document as an indented tree
pub fn to_treeviz_str(doc: &Document) -> String {
    let mut writer = TreeWriter {
        lines: vec!["⧉ Document".to_string()],
    };
    walk_blocks(&mut writer, &doc.blocks, 0);
    writer.lines.join("\n")
}

pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Indented debug view of the document tree"
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(to_treeviz_str(doc))
    }
}
