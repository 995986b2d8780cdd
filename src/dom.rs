//! RcDom helpers shared by the markup serializer, the Markdown exporter and the SVG engine

use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute,
    LocalName, ParseOpts, QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Create an HTML element with attributes, in the given order
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

pub fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Parse a markup fragment and return the nodes it produces inside `<body>`
///
/// The html5ever tree builder never fails; malformed input is repaired the way a browser would.
/// The markup is parsed as if it followed an opening `<body>` tag, so leading whitespace and
/// head-only elements stay in the fragment.
///
/// The nodes are moved out of the document before it is dropped. Dropping an `RcDom` empties
/// every node it still owns, so cloned handles would come back childless.
pub fn parse_fragment(markup: &str) -> Vec<Handle> {
    let source = format!("<body>{}", markup);
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);
    let Some(body) = find_element(&dom.document, "body") else {
        return Vec::new();
    };
    let nodes = std::mem::take(&mut *body.children.borrow_mut());
    nodes
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if element_name(node).as_deref() == Some(tag) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// Write nodes (each including itself) as HTML, joined by `separator`
pub fn serialize_nodes(nodes: &[Handle], separator: &str) -> String {
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    let mut parts = Vec::with_capacity(nodes.len());
    for node in nodes {
        let mut output = Vec::new();
        let serializable = SerializableHandle::from(node.clone());
        // Writing into a Vec<u8> has no failure mode of its own.
        if let Err(e) = serialize(&mut output, &serializable, opts.clone()) {
            tracing::debug!(error = %e, "markup serialization failed for node");
            continue;
        }
        parts.push(String::from_utf8_lossy(&output).into_owned());
    }
    parts.join(separator)
}

/// Local tag name of an element node
pub fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

pub fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    attr(node, "class")
        .map(|value| value.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Concatenated text of a node and all its descendants
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    push_text(node, &mut out);
    out
}

fn push_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                push_text(child, out);
            }
        }
    }
}
