//! Markup serialization (document tree → HTML)
//!
//! Pipeline: document tree → RcDom → HTML string.
//!
//! Charts are the only nodes with more than one possible output:
//!
//!     | Node                        | Output                                           |
//!     | Pending                     | `<pre class="streamdoc-chart-pending" ...>`      |
//!     | Live, mounted               | `<img class="streamdoc-chart-export-img" ...>`   |
//!     | Live, mounted, no raster    | placeholder paragraph                            |
//!     | Live, never mounted         | same as Pending                                  |
//!     | Pending, payload broken     | pending `<pre>` showing the raw carrier          |
//!     | Live, payload broken        | placeholder paragraph                            |
//!
//! Serialization is total: every tree produces markup, and per-node trouble turns into a
//! fallback rather than an error. A pending chart always keeps its carrier attribute, so the
//! configuration text survives even when it cannot be read.

use crate::ast::{Block, Chart, CodeBlock, Document, Inline, List, Table, TableCell};
use crate::codec;
use crate::dom::{append, create_element, create_text, parse_fragment, serialize_nodes};
use crate::render::rasterize;
use markup5ever_rcdom::Handle;
use serde::Deserialize;

/// Class carried by the markup form of a pending chart
pub const PENDING_CLASS: &str = "streamdoc-chart-pending";
/// Class carried by the rasterized image of a live chart
pub const EXPORT_IMG_CLASS: &str = "streamdoc-chart-export-img";
/// Attribute holding the chart carrier string
pub const OPTION_ATTR: &str = "data-chart-option";

/// Texts written in place of charts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkupOptions {
    /// Paragraph text for charts that cannot be shown
    pub placeholder: String,
    /// `alt` text of rasterized chart images
    pub image_alt: String,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        MarkupOptions {
            placeholder: "[chart not rendered]".to_string(),
            image_alt: "chart".to_string(),
        }
    }
}

/// Serialize a document to markup, one top-level block per line
pub fn serialize_markup(doc: &Document, options: &MarkupOptions) -> String {
    let nodes: Vec<Handle> = doc
        .blocks
        .iter()
        .flat_map(|block| build_block(block, options))
        .collect();
    serialize_nodes(&nodes, "\n")
}

fn build_block(block: &Block, options: &MarkupOptions) -> Vec<Handle> {
    match block {
        Block::Paragraph(p) => vec![element_with_inlines("p", &p.content)],
        Block::Heading(h) => {
            let tag = format!("h{}", h.level.clamp(1, 6));
            vec![element_with_inlines(&tag, &h.content)]
        }
        Block::List(list) => vec![build_list(list, options)],
        Block::Table(table) => vec![build_table(table)],
        Block::CodeBlock(code) => vec![build_code(code)],
        Block::Chart(chart) => vec![build_chart(chart, options)],
        Block::BlockQuote(quote) => {
            let element = create_element("blockquote", vec![]);
            for child in &quote.children {
                for node in build_block(child, options) {
                    append(&element, node);
                }
            }
            vec![element]
        }
        Block::Rule => vec![create_element("hr", vec![])],
        Block::Html(raw) => parse_fragment(raw.trim_end()),
    }
}

fn build_list(list: &List, options: &MarkupOptions) -> Handle {
    let start = list.start.to_string();
    let (tag, attrs) = if list.ordered && list.start != 1 {
        ("ol", vec![("start", start.as_str())])
    } else if list.ordered {
        ("ol", vec![])
    } else {
        ("ul", vec![])
    };
    let element = create_element(tag, attrs);

    for item in &list.items {
        let li = create_element("li", vec![]);
        if let Some(checked) = item.task {
            let mut attrs = vec![("type", "checkbox")];
            if checked {
                attrs.push(("checked", ""));
            }
            attrs.push(("disabled", ""));
            append(&li, create_element("input", attrs));
            append(&li, create_text(" "));
        }
        for child in &item.children {
            match child {
                // Tight lists keep item text inline, without a paragraph wrapper
                Block::Paragraph(p) if list.tight => append_inlines(&li, &p.content),
                other => {
                    for node in build_block(other, options) {
                        append(&li, node);
                    }
                }
            }
        }
        append(&element, li);
    }
    element
}

fn build_table(table: &Table) -> Handle {
    let element = create_element("table", vec![]);

    let thead = create_element("thead", vec![]);
    append(&thead, build_row(table, &table.header, "th"));
    append(&element, thead);

    if !table.rows.is_empty() {
        let tbody = create_element("tbody", vec![]);
        for row in &table.rows {
            append(&tbody, build_row(table, row, "td"));
        }
        append(&element, tbody);
    }
    element
}

fn build_row(table: &Table, cells: &[TableCell], tag: &str) -> Handle {
    let tr = create_element("tr", vec![]);
    for (index, cell) in cells.iter().enumerate() {
        let align = table
            .alignments
            .get(index)
            .and_then(|alignment| alignment.as_attr());
        let attrs = align.map(|a| vec![("align", a)]).unwrap_or_default();
        let element = create_element(tag, attrs);
        append_inlines(&element, &cell.content);
        append(&tr, element);
    }
    tr
}

fn build_code(code: &CodeBlock) -> Handle {
    let pre = create_element("pre", vec![]);
    let class = code.language.as_ref().map(|lang| format!("language-{}", lang));
    let attrs = class
        .as_deref()
        .map(|c| vec![("class", c)])
        .unwrap_or_default();
    let inner = create_element("code", attrs);
    append(&inner, create_text(&code.literal));
    append(&pre, inner);
    pre
}

fn build_chart(chart: &Chart, options: &MarkupOptions) -> Handle {
    match chart {
        Chart::Pending { payload } => {
            let text = codec::decode_pretty(payload).unwrap_or_else(|e| {
                tracing::debug!(
                    error = %e,
                    "pending chart payload does not decode, showing the carrier"
                );
                payload.clone()
            });
            pending_element(payload, &text)
        }
        Chart::Live {
            rendering: Some(handle),
            ..
        } => match rasterize(handle) {
            Ok(image) => {
                let src = image.to_data_url();
                create_element(
                    "img",
                    vec![
                        ("src", src.as_str()),
                        ("alt", options.image_alt.as_str()),
                        ("class", EXPORT_IMG_CLASS),
                    ],
                )
            }
            Err(e) => {
                tracing::debug!(error = %e, "chart has no raster image, writing placeholder");
                placeholder(options)
            }
        },
        // Never mounted: keep the configuration in its pending form so nothing is lost
        Chart::Live {
            payload,
            rendering: None,
        } => match codec::decode_pretty(payload) {
            Ok(pretty) => pending_element(payload, &pretty),
            Err(e) => {
                tracing::debug!(error = %e, "chart payload does not decode, writing placeholder");
                placeholder(options)
            }
        },
    }
}

/// The read-only code block a pending chart displays as
fn pending_element(payload: &str, text: &str) -> Handle {
    let pre = create_element(
        "pre",
        vec![
            ("class", PENDING_CLASS),
            ("contenteditable", "false"),
            (OPTION_ATTR, payload),
        ],
    );
    let code = create_element("code", vec![]);
    append(&code, create_text(text));
    append(&pre, code);
    pre
}

fn placeholder(options: &MarkupOptions) -> Handle {
    let p = create_element("p", vec![]);
    append(&p, create_text(&options.placeholder));
    p
}

fn element_with_inlines(tag: &str, inlines: &[Inline]) -> Handle {
    let element = create_element(tag, vec![]);
    append_inlines(&element, inlines);
    element
}

/// Append inline content to `parent`
///
/// Raw inline markup only makes sense together with its siblings (`<b>` and `</b>` arrive as
/// separate nodes), so a run containing any is serialized to text and re-parsed as one fragment.
fn append_inlines(parent: &Handle, inlines: &[Inline]) {
    if inlines.iter().any(|i| matches!(i, Inline::Html(_))) {
        let markup: String = inlines
            .iter()
            .map(|inline| match inline {
                Inline::Html(raw) => raw.clone(),
                other => serialize_nodes(&inline_nodes(other), ""),
            })
            .collect();
        for node in parse_fragment(&markup) {
            append(parent, node);
        }
        return;
    }

    for inline in inlines {
        for node in inline_nodes(inline) {
            append(parent, node);
        }
    }
}

fn inline_nodes(inline: &Inline) -> Vec<Handle> {
    let node = match inline {
        Inline::Text(text) => create_text(text),
        Inline::Emphasis(children) => element_with_inlines("em", children),
        Inline::Strong(children) => element_with_inlines("strong", children),
        Inline::Strikethrough(children) => element_with_inlines("del", children),
        Inline::Code(text) => {
            let code = create_element("code", vec![]);
            append(&code, create_text(text));
            code
        }
        Inline::Link(link) => {
            let mut attrs = vec![("href", link.url.as_str())];
            if !link.title.is_empty() {
                attrs.push(("title", link.title.as_str()));
            }
            let a = create_element("a", attrs);
            append_inlines(&a, &link.content);
            a
        }
        Inline::Image(image) => {
            let mut attrs = vec![("src", image.url.as_str()), ("alt", image.alt.as_str())];
            if !image.title.is_empty() {
                attrs.push(("title", image.title.as_str()));
            }
            create_element("img", attrs)
        }
        Inline::LineBreak => create_element("br", vec![]),
        Inline::Html(raw) => return parse_fragment(raw),
    };
    vec![node]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::markdown::parser::{parse_markdown, ParseOptions};
    use crate::render::ChartEngine;
    use crate::testing::engine::StubEngine;
    use serde_json::json;

    fn markup(source: &str) -> String {
        let doc = parse_markdown(source, &ParseOptions::live());
        serialize_markup(&doc, &MarkupOptions::default())
    }

    #[test]
    fn test_basic_blocks() {
        insta::assert_snapshot!(markup("# Title\n\nHello *world* & co"), @r###"
        <h1>Title</h1>
        <p>Hello <em>world</em> &amp; co</p>
        "###);
    }

    #[test]
    fn test_escaped_text() {
        assert_eq!(markup("a &lt; b"), "<p>a &lt; b</p>");
    }

    #[test]
    fn test_line_break_and_code_span() {
        assert_eq!(markup("one\ntwo `x`"), "<p>one<br>two <code>x</code></p>");
    }

    #[test]
    fn test_tight_task_list() {
        assert_eq!(
            markup("- [x] done\n- [ ] todo"),
            "<ul><li><input type=\"checkbox\" checked=\"\" disabled=\"\"> done</li>\
             <li><input type=\"checkbox\" disabled=\"\"> todo</li></ul>"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(markup("3. c\n4. d"), "<ol start=\"3\"><li>c</li><li>d</li></ol>");
    }

    #[test]
    fn test_table_alignment() {
        assert_eq!(
            markup("| a | b |\n| :-- | --: |\n| 1 | 2 |"),
            "<table><thead><tr><th align=\"left\">a</th><th align=\"right\">b</th></tr></thead>\
             <tbody><tr><td align=\"left\">1</td><td align=\"right\">2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_code_block_language_class() {
        assert_eq!(
            markup("```rust\nlet x = 1 < 2;\n```"),
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;\n</code></pre>"
        );
    }

    #[test]
    fn test_pending_chart_markup() {
        let doc = parse_markdown("```echarts\n{\"series\":[]}\n```", &ParseOptions::pending());
        assert_eq!(
            serialize_markup(&doc, &MarkupOptions::default()),
            "<pre class=\"streamdoc-chart-pending\" contenteditable=\"false\" \
             data-chart-option=\"eyJzZXJpZXMiOltdfQ==\"><code>{\n  \"series\": []\n}</code></pre>"
        );
    }

    #[test]
    fn test_unmounted_live_chart_keeps_pending_form() {
        let pending = parse_markdown("```chart\n{\"a\":1}\n```", &ParseOptions::pending());
        let live = parse_markdown("```chart\n{\"a\":1}\n```", &ParseOptions::live());
        let options = MarkupOptions::default();
        assert_eq!(
            serialize_markup(&live, &options),
            serialize_markup(&pending, &options)
        );
    }

    #[test]
    fn test_mounted_chart_becomes_image() {
        let mut doc = parse_markdown("```chart\n{\"a\":1}\n```", &ParseOptions::live());
        let handle = StubEngine::with_snapshot().mount(&json!({})).unwrap();
        doc.chart_mut(0).unwrap().attach(handle);
        assert_eq!(
            serialize_markup(&doc, &MarkupOptions::default()),
            "<img src=\"data:image/png;base64,cG5n\" alt=\"chart\" class=\"streamdoc-chart-export-img\">"
        );
    }

    #[test]
    fn test_surface_fallback() {
        let mut doc = parse_markdown("```chart\n{}\n```", &ParseOptions::live());
        let handle = StubEngine::surface_only().mount(&json!({})).unwrap();
        doc.chart_mut(0).unwrap().attach(handle);
        let out = serialize_markup(&doc, &MarkupOptions::default());
        assert!(out.starts_with("<img src=\"data:image/bmp;base64,Ym1w\""));
    }

    #[test]
    fn test_placeholder_when_nothing_to_rasterize() {
        let mut doc = parse_markdown("```chart\n{}\n```", &ParseOptions::live());
        let handle = StubEngine::blank().mount(&json!({})).unwrap();
        doc.chart_mut(0).unwrap().attach(handle);
        let options = MarkupOptions {
            placeholder: "[no chart]".to_string(),
            image_alt: "chart".to_string(),
        };
        assert_eq!(serialize_markup(&doc, &options), "<p>[no chart]</p>");
    }

    #[test]
    fn test_undecodable_pending_payload_keeps_carrier() {
        let doc = Document::new(vec![Block::Chart(Chart::Pending {
            payload: "%%%".to_string(),
        })]);
        assert_eq!(
            serialize_markup(&doc, &MarkupOptions::default()),
            "<pre class=\"streamdoc-chart-pending\" contenteditable=\"false\" \
             data-chart-option=\"%%%\"><code>%%%</code></pre>"
        );
    }

    #[test]
    fn test_undecodable_live_payload_is_placeholder() {
        let doc = Document::new(vec![Block::Chart(Chart::Live {
            payload: "%%%".to_string(),
            rendering: None,
        })]);
        assert_eq!(
            serialize_markup(&doc, &MarkupOptions::default()),
            "<p>[chart not rendered]</p>"
        );
    }

    #[test]
    fn test_raw_inline_markup_pairs_up() {
        assert_eq!(
            markup("a <b>bold</b> z"),
            "<p>a <b>bold</b> z</p>"
        );
    }

    #[test]
    fn test_serialization_is_stable() {
        let doc = parse_markdown("# A\n\n```chart\n{\"x\": [1, 2]}\n```\n", &ParseOptions::live());
        let options = MarkupOptions::default();
        assert_eq!(serialize_markup(&doc, &options), serialize_markup(&doc, &options));
    }
}
