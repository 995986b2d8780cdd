//! Markdown export (markup → Markdown)
//!
//! Pipeline: HTML string → RcDom → Comrak AST → Markdown string.
//!
//! The exporter reads markup, not the document tree, so it accepts anything the markup
//! serializer writes and also markup edited by hand in a host surface. Charts arrive in one of
//! three shapes:
//!
//!     | Markup                                   | Markdown                            |
//!     | `<img class="streamdoc-chart-export-img">` | `![chart](data:...)` like any image |
//!     | `<pre class="streamdoc-chart-pending">`    | fenced `chart` block, pretty JSON   |
//!     | pending `<pre>` whose carrier is broken    | nothing                             |
//!
//! Writing Markdown text is left to comrak's CommonMark formatter, which owns block layout and
//! escaping. Two characters it leaves bare would change meaning on the way back in: `~` (fences
//! and strikethrough) and `&` in front of `#` (numeric entities). Those are written as explicit
//! backslash escapes.

use crate::codec;
use crate::dom::{attr, element_name, has_class, parse_fragment, text_content};
use crate::formats::html::serializer::{OPTION_ATTR, PENDING_CLASS};
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeLink,
    NodeList, NodeTable, NodeValue, TableAlignment,
};
use comrak::{format_commonmark, Arena, ComrakOptions};
use markup5ever_rcdom::{Handle, NodeData};
use std::cell::RefCell;

/// Fence info string written for recovered charts
pub const CHART_FENCE: &str = "chart";

/// Convert markup to portable Markdown
pub fn to_portable_text(markup: &str) -> String {
    let nodes = parse_fragment(markup);

    let arena = Arena::new();
    let root = new_node(&arena, NodeValue::Document);
    append_blocks(&arena, root, &nodes);

    let mut output = Vec::new();
    if let Err(e) = format_commonmark(root, &default_comrak_options(), &mut output) {
        tracing::debug!(error = %e, "markdown formatting failed");
        return String::new();
    }
    let markdown = String::from_utf8_lossy(&output);

    // Comrak separates a list from a following list or code block with a marker comment
    markdown
        .replace("<!-- end list -->\n", "")
        .trim()
        .to_string()
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.render.unsafe_ = true;
    options.render.prefer_fenced = true;
    options
}

fn new_node<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn children(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

fn is_block(node: &Handle) -> bool {
    matches!(
        element_name(node).as_deref(),
        Some(
            "p" | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "ul"
                | "ol"
                | "pre"
                | "table"
                | "blockquote"
                | "hr"
                | "div"
                | "section"
                | "article"
                | "header"
                | "footer"
                | "figure"
        )
    )
}

/// Append a node sequence; consecutive inline nodes form one paragraph
fn append_blocks<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, nodes: &[Handle]) {
    let mut run: Vec<Handle> = Vec::new();
    for node in nodes {
        if is_block(node) {
            flush_paragraph(arena, parent, &mut run);
            append_block(arena, parent, node);
        } else {
            run.push(node.clone());
        }
    }
    flush_paragraph(arena, parent, &mut run);
}

fn flush_paragraph<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    run: &mut Vec<Handle>,
) {
    if run.is_empty() {
        return;
    }
    append_paragraph(arena, parent, run);
    run.clear();
}

fn append_paragraph<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    nodes: &[Handle],
) {
    let paragraph = new_node(arena, NodeValue::Paragraph);
    append_inlines(arena, paragraph, nodes);
    trim_edges(paragraph);
    if paragraph.first_child().is_some() {
        parent.append(paragraph);
    }
}

fn append_block<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, node: &Handle) {
    let Some(name) = element_name(node) else {
        return;
    };
    match name.as_str() {
        "p" => append_paragraph(arena, parent, &children(node)),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<u8>().unwrap_or(1);
            let heading = new_node(
                arena,
                NodeValue::Heading(NodeHeading {
                    level,
                    setext: false,
                }),
            );
            append_inlines(arena, heading, &children(node));
            // A heading is a single line
            replace_line_breaks(heading, || NodeValue::Text(" ".to_string()));
            trim_edges(heading);
            parent.append(heading);
        }
        "pre" if has_class(node, PENDING_CLASS) => {
            if let Some(block) = pending_chart(arena, node) {
                parent.append(block);
            }
        }
        "pre" => parent.append(code_block(arena, code_language(node), code_text(node))),
        "ul" => append_list(arena, parent, node, false),
        "ol" => append_list(arena, parent, node, true),
        "table" => append_table(arena, parent, node),
        "blockquote" => {
            let quote = new_node(arena, NodeValue::BlockQuote);
            append_blocks(arena, quote, &children(node));
            if quote.first_child().is_some() {
                parent.append(quote);
            }
        }
        "hr" => parent.append(new_node(arena, NodeValue::ThematicBreak)),
        _ => append_blocks(arena, parent, &children(node)),
    }
}

/// Recover the chart fence from a pending chart; a broken carrier drops the chart
fn pending_chart<'a>(arena: &'a Arena<AstNode<'a>>, pre: &Handle) -> Option<&'a AstNode<'a>> {
    let carrier = attr(pre, OPTION_ATTR).unwrap_or_default();
    match codec::decode_pretty(&carrier) {
        Ok(pretty) => Some(code_block(arena, CHART_FENCE.to_string(), pretty)),
        Err(e) => {
            tracing::debug!(error = %e, "dropping pending chart with unreadable carrier");
            None
        }
    }
}

fn code_block<'a>(
    arena: &'a Arena<AstNode<'a>>,
    info: String,
    mut literal: String,
) -> &'a AstNode<'a> {
    if !literal.ends_with('\n') {
        literal.push('\n');
    }
    new_node(
        arena,
        NodeValue::CodeBlock(NodeCodeBlock {
            fenced: true,
            fence_char: b'`',
            fence_length: 3,
            fence_offset: 0,
            info,
            literal,
        }),
    )
}

fn inner_code(pre: &Handle) -> Option<Handle> {
    children(pre)
        .into_iter()
        .find(|child| element_name(child).as_deref() == Some("code"))
}

fn code_language(pre: &Handle) -> String {
    inner_code(pre)
        .and_then(|code| attr(&code, "class"))
        .and_then(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-").map(str::to_string))
        })
        .unwrap_or_default()
}

fn code_text(pre: &Handle) -> String {
    text_content(&inner_code(pre).unwrap_or_else(|| pre.clone()))
}

fn append_list<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    node: &Handle,
    ordered: bool,
) {
    let items: Vec<Handle> = children(node)
        .into_iter()
        .filter(|child| element_name(child).as_deref() == Some("li"))
        .collect();
    if items.is_empty() {
        return;
    }

    // Loose items wrap their text in paragraphs
    let tight = !items.iter().any(|li| {
        children(li)
            .iter()
            .any(|n| element_name(n).as_deref() == Some("p"))
    });
    let list = NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start: attr(node, "start")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1),
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight,
    };
    let list_node = new_node(arena, NodeValue::List(list));

    for li in items {
        let mut nodes = children(&li);
        let value = match take_checkbox(&mut nodes) {
            Some(checked) => NodeValue::TaskItem(checked.then_some('x')),
            None => NodeValue::Item(list),
        };
        let item = new_node(arena, value);
        append_blocks(arena, item, &nodes);
        list_node.append(item);
    }
    parent.append(list_node);
}

/// Remove a leading checkbox from an item's children, returning whether it was checked
fn take_checkbox(nodes: &mut Vec<Handle>) -> Option<bool> {
    let position = nodes.iter().position(|n| !is_blank_text(n))?;
    let first = &nodes[position];
    if element_name(first).as_deref() != Some("input")
        || attr(first, "type").as_deref() != Some("checkbox")
    {
        return None;
    }
    let checked = attr(first, "checked").is_some();
    nodes.drain(..=position);
    Some(checked)
}

fn is_blank_text(node: &Handle) -> bool {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().trim().is_empty(),
        _ => false,
    }
}

fn append_table<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, table: &Handle) {
    let mut rows: Vec<(bool, Handle)> = Vec::new();
    collect_rows(table, false, &mut rows);
    if rows.is_empty() {
        return;
    }

    // Header is the first `thead` row, or the first row when there is no `thead`
    let header_index = rows.iter().position(|(in_head, _)| *in_head).unwrap_or(0);
    let header = row_cells(&rows.remove(header_index).1);
    let body: Vec<Vec<Handle>> = rows.iter().map(|(_, row)| row_cells(row)).collect();
    let num_columns = body.iter().map(Vec::len).fold(header.len(), usize::max);

    let mut alignments: Vec<TableAlignment> = header
        .iter()
        .map(|cell| alignment_of(attr(cell, "align").as_deref()))
        .collect();
    alignments.resize(num_columns, TableAlignment::None);

    let table_node = new_node(
        arena,
        NodeValue::Table(NodeTable {
            alignments,
            num_columns,
            num_rows: body.len(),
            num_nonempty_cells: 0,
        }),
    );
    table_node.append(table_row(arena, &header, num_columns, true));
    for row in &body {
        table_node.append(table_row(arena, row, num_columns, false));
    }
    parent.append(table_node);
}

fn alignment_of(align: Option<&str>) -> TableAlignment {
    match align.map(str::to_ascii_lowercase).as_deref() {
        Some("left") => TableAlignment::Left,
        Some("center") => TableAlignment::Center,
        Some("right") => TableAlignment::Right,
        _ => TableAlignment::None,
    }
}

/// A row padded to `num_columns` cells
fn table_row<'a>(
    arena: &'a Arena<AstNode<'a>>,
    cells: &[Handle],
    num_columns: usize,
    header: bool,
) -> &'a AstNode<'a> {
    let row = new_node(arena, NodeValue::TableRow(header));
    for index in 0..num_columns {
        let cell = new_node(arena, NodeValue::TableCell);
        if let Some(source) = cells.get(index) {
            append_inlines(arena, cell, &children(source));
            // Rows are single lines; breaks stay as markup
            replace_line_breaks(cell, || NodeValue::HtmlInline("<br>".to_string()));
            trim_edges(cell);
        }
        row.append(cell);
    }
    row
}

fn collect_rows(node: &Handle, in_head: bool, rows: &mut Vec<(bool, Handle)>) {
    for child in children(node) {
        match element_name(&child).as_deref() {
            Some("tr") => rows.push((in_head, child.clone())),
            Some("thead") => collect_rows(&child, true, rows),
            Some("tbody") | Some("tfoot") => collect_rows(&child, in_head, rows),
            _ => {}
        }
    }
}

fn row_cells(row: &Handle) -> Vec<Handle> {
    children(row)
        .into_iter()
        .filter(|c| matches!(element_name(c).as_deref(), Some("th" | "td")))
        .collect()
}

fn append_inlines<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, nodes: &[Handle]) {
    for node in nodes {
        append_inline(arena, parent, node);
    }
}

fn append_inline<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, node: &Handle) {
    let name = match &node.data {
        NodeData::Text { contents } => {
            append_text(arena, parent, &collapse_whitespace(&contents.borrow()));
            return;
        }
        NodeData::Element { name, .. } => name.local.to_string(),
        _ => return,
    };

    match name.as_str() {
        "strong" | "b" => append_wrapped(arena, parent, node, NodeValue::Strong),
        "em" | "i" => append_wrapped(arena, parent, node, NodeValue::Emph),
        "del" | "s" | "strike" => append_wrapped(arena, parent, node, NodeValue::Strikethrough),
        "code" => {
            let literal = text_content(node).replace('\n', " ");
            if !literal.is_empty() {
                parent.append(new_node(
                    arena,
                    NodeValue::Code(NodeCode {
                        num_backticks: 1,
                        literal,
                    }),
                ));
            }
        }
        "br" => parent.append(new_node(arena, NodeValue::LineBreak)),
        "a" => {
            let link = new_node(
                arena,
                NodeValue::Link(NodeLink {
                    url: attr(node, "href").unwrap_or_default(),
                    title: attr(node, "title").unwrap_or_default(),
                }),
            );
            append_inlines(arena, link, &children(node));
            parent.append(link);
        }
        "img" => {
            let image = new_node(
                arena,
                NodeValue::Image(NodeLink {
                    url: attr(node, "src").unwrap_or_default(),
                    title: attr(node, "title").unwrap_or_default(),
                }),
            );
            append_text(arena, image, &attr(node, "alt").unwrap_or_default());
            parent.append(image);
        }
        "input" | "script" | "style" => {}
        _ => append_inlines(arena, parent, &children(node)),
    }
}

/// Wrap inline content in a delimiter node, keeping edge whitespace outside it
fn append_wrapped<'a>(
    arena: &'a Arena<AstNode<'a>>,
    parent: &'a AstNode<'a>,
    node: &Handle,
    value: NodeValue,
) {
    let wrapper = new_node(arena, value);
    append_inlines(arena, wrapper, &children(node));
    let (leading, trailing) = trim_edges(wrapper);
    if leading {
        append_text(arena, parent, " ");
    }
    if wrapper.first_child().is_some() {
        parent.append(wrapper);
    }
    if trailing {
        append_text(arena, parent, " ");
    }
}

/// Append text, writing the characters the formatter leaves bare as explicit escapes
fn append_text<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, text: &str) {
    // After a break, leading spaces would read as indentation
    let after_break = parent
        .last_child()
        .map_or(false, |last| matches!(last.data.borrow().value, NodeValue::LineBreak));
    let text = if after_break { text.trim_start() } else { text };

    let mut plain = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '~' || (c == '&' && chars.peek() == Some(&'#')) {
            push_plain(arena, parent, &mut plain);
            parent.append(new_node(arena, NodeValue::HtmlInline(format!("\\{}", c))));
        } else {
            plain.push(c);
        }
    }
    push_plain(arena, parent, &mut plain);
}

/// Move `plain` into the last text child of `parent`, or a new one
fn push_plain<'a>(arena: &'a Arena<AstNode<'a>>, parent: &'a AstNode<'a>, plain: &mut String) {
    if plain.is_empty() {
        return;
    }
    let text = std::mem::take(plain);
    if let Some(last) = parent.last_child() {
        if let NodeValue::Text(existing) = &mut last.data.borrow_mut().value {
            existing.push_str(&text);
            return;
        }
    }
    parent.append(new_node(arena, NodeValue::Text(text)));
}

/// Trim whitespace off the outer text children of `node`, reporting which edges lost some
fn trim_edges<'a>(node: &'a AstNode<'a>) -> (bool, bool) {
    let leading = node
        .first_child()
        .map_or(false, |first| trim_text(first, str::trim_start));
    let trailing = node
        .last_child()
        .map_or(false, |last| trim_text(last, str::trim_end));
    (leading, trailing)
}

fn trim_text<'a>(node: &'a AstNode<'a>, trim: fn(&str) -> &str) -> bool {
    let emptied = {
        let mut ast = node.data.borrow_mut();
        let NodeValue::Text(text) = &mut ast.value else {
            return false;
        };
        let trimmed = trim(text).to_string();
        if trimmed.len() == text.len() {
            return false;
        }
        *text = trimmed;
        text.is_empty()
    };
    if emptied {
        node.detach();
    }
    true
}

fn replace_line_breaks<'a>(node: &'a AstNode<'a>, replacement: impl Fn() -> NodeValue) {
    for descendant in node.descendants() {
        let mut ast = descendant.data.borrow_mut();
        if matches!(ast.value, NodeValue::LineBreak) {
            ast.value = replacement();
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
