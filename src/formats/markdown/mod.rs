//! Markdown format implementation
//!
//! Data Model:
//!
//!     | Markdown                       | Tree                      | Notes                        |
//!     | ATX / setext heading           | Heading                   | level 1-6                    |
//!     | paragraph                      | Paragraph                 | soft breaks become breaks    |
//!     | bullet / ordered / task list   | List, ListItem            | `task` holds the checkbox    |
//!     | GFM table                      | Table                     | cells keep inline formatting |
//!     | fence tagged `chart`/`echarts` | Chart                     | only if the body is JSON     |
//!     | any other fence                | CodeBlock                 |                              |
//!     | raw HTML                       | Html (block or inline)    | passed through               |
//!
//!     Export goes the long way round: tree → markup ([`crate::formats::html`]) → Markdown.
//!     That is what rasterizes mounted charts, and it means hand-edited markup exports the
//!     same way a parsed document does.
//!
//! Library
//!
//!     Parsing uses comrak (CommonMark plus the GFM extensions). Export reads markup with
//!     html5ever.

pub mod exporter;
pub mod parser;

use crate::ast::Document;
use crate::error::FormatError;
use crate::format::Format;
use crate::formats::html::serializer::{serialize_markup, MarkupOptions};
use parser::{parse_markdown, ParseOptions};

pub use exporter::to_portable_text;

/// Markdown format: parses with live charts, serializes through markup
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormat {
    options: MarkupOptions,
}

impl MarkdownFormat {
    pub fn new(options: MarkupOptions) -> Self {
        MarkdownFormat { options }
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark + GFM with chart fences"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(parse_markdown(source, &ParseOptions::live()))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(to_portable_text(&serialize_markup(doc, &self.options)))
    }
}
