//! HTML format implementation
//!
//! One-way serialization of the tree into the portable markup the rest of the crate speaks.
//!
//! | Tree           | HTML                                          |
//! |----------------|-----------------------------------------------|
//! | Heading        | `<h1>`-`<h6>`                                 |
//! | Paragraph      | `<p>`                                         |
//! | List           | `<ul>` / `<ol start>`, task items get a disabled checkbox |
//! | Table          | `<table>` with `<thead>`, `<tbody>` and `align` |
//! | CodeBlock      | `<pre><code class="language-X">`              |
//! | Chart          | see [`serializer`]                            |
//! | Html           | re-parsed and written back normalized         |

pub mod serializer;

use crate::ast::Document;
use crate::error::FormatError;
use crate::format::Format;
use serializer::{serialize_markup, MarkupOptions};

#[derive(Debug, Clone, Default)]
pub struct HtmlFormat {
    options: MarkupOptions,
}

impl HtmlFormat {
    pub fn new(options: MarkupOptions) -> Self {
        HtmlFormat { options }
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML fragment with rasterized charts"
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(serialize_markup(doc, &self.options))
    }
}
