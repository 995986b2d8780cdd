//! Inline content

use super::traits::AstNode;

/// An inline node inside a paragraph, heading, list item or table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Code(String),
    Link(Link),
    Image(Image),
    LineBreak,
    /// Raw inline markup, passed through untouched
    Html(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub url: String,
    pub title: String,
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: String,
    pub title: String,
    pub alt: String,
}

impl Inline {
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text(value.into())
    }

    pub fn children(&self) -> Option<&[Inline]> {
        match self {
            Inline::Emphasis(c) | Inline::Strong(c) | Inline::Strikethrough(c) => Some(c),
            Inline::Link(link) => Some(&link.content),
            _ => None,
        }
    }
}

impl AstNode for Inline {
    fn node_type(&self) -> &'static str {
        match self {
            Inline::Text(_) => "Text",
            Inline::Emphasis(_) => "Emphasis",
            Inline::Strong(_) => "Strong",
            Inline::Strikethrough(_) => "Strikethrough",
            Inline::Code(_) => "Code",
            Inline::Link(_) => "Link",
            Inline::Image(_) => "Image",
            Inline::LineBreak => "LineBreak",
            Inline::Html(_) => "Html",
        }
    }

    fn display_label(&self) -> String {
        match self {
            Inline::Text(t) | Inline::Code(t) | Inline::Html(t) => t.clone(),
            Inline::Link(link) => link.url.clone(),
            Inline::Image(image) => image.url.clone(),
            Inline::LineBreak => String::new(),
            other => plain_text(other.children().unwrap_or_default()),
        }
    }
}

/// Flatten inline content to the text a reader would see
///
/// Line breaks become `\n`, images contribute nothing and raw markup is dropped.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::LineBreak => out.push('\n'),
            Inline::Image(_) | Inline::Html(_) => {}
            Inline::Emphasis(c) | Inline::Strong(c) | Inline::Strikethrough(c) => {
                push_plain_text(c, out)
            }
            Inline::Link(link) => push_plain_text(&link.content, out),
        }
    }
}
