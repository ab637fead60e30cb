//! HTML-backed page tree
//!
//! `Document` parses markup with `scraper` (html5ever) and copies the visible
//! part of the tree into a flat arena. Node handles are plain indices, so the
//! document is `Send`, cheap to navigate in both directions, and owns nothing
//! borrowed from the parser.

use crate::dom::tree::{DomTree, NodeKind};
use crate::error::{ExtractionError, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Subtrees that never contribute rendered text
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Index of a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed page
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    slots: Vec<Slot>,
    /// Element ids in pre-order, used to map selector hits back to the arena
    elements: Vec<NodeId>,
    body: Option<NodeId>,
}

impl Document {
    /// Parse an HTML document
    #[instrument(skip(html), fields(bytes = html.len()))]
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Document {
            source: html.to_string(),
            slots: Vec::new(),
            elements: Vec::new(),
            body: None,
        };
        doc.build_element(parsed.root_element(), None);
        debug!(
            "Parsed document: {} nodes, {} elements",
            doc.slots.len(),
            doc.elements.len()
        );
        doc
    }

    /// Wrap plain text in a minimal document
    pub fn from_text(text: &str) -> Self {
        let mut doc = Document {
            source: String::new(),
            slots: Vec::new(),
            elements: Vec::new(),
            body: None,
        };
        let html = doc.push(
            NodeData::Element {
                tag: "html".to_string(),
                attrs: Vec::new(),
            },
            None,
        );
        doc.elements.push(html);
        let body = doc.push(
            NodeData::Element {
                tag: "body".to_string(),
                attrs: Vec::new(),
            },
            Some(html),
        );
        doc.elements.push(body);
        doc.body = Some(body);
        if !text.is_empty() {
            doc.push(NodeData::Text(text.to_string()), Some(body));
        }
        doc
    }

    /// Number of nodes in the visible tree
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the document has no nodes
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn push(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            data,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.slots[parent.0].children.push(id);
        }
        id
    }

    fn build_element(&mut self, el: ElementRef<'_>, parent: Option<NodeId>) -> NodeId {
        let tag = el.value().name().to_ascii_lowercase();
        let attrs = el
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let is_body = tag == "body";
        let id = self.push(NodeData::Element { tag, attrs }, parent);
        self.elements.push(id);
        if is_body && self.body.is_none() {
            self.body = Some(id);
        }

        for child in el.children() {
            match child.value() {
                scraper::Node::Text(text) => {
                    let content: &str = text;
                    if !content.is_empty() {
                        self.push(NodeData::Text(content.to_string()), Some(id));
                    }
                }
                scraper::Node::Element(child_el) if !is_hidden(child_el.name()) => {
                    if let Some(child_ref) = ElementRef::wrap(child) {
                        self.build_element(child_ref, Some(id));
                    }
                }
                _ => {}
            }
        }
        id
    }

    fn slot(&self, node: NodeId) -> &Slot {
        &self.slots[node.0]
    }
}

fn is_hidden(tag: &str) -> bool {
    HIDDEN_TAGS.iter().any(|hidden| tag.eq_ignore_ascii_case(hidden))
}

/// Walks the parser's tree in the same order `build_element` did and
/// collects the arena ids of matching elements.
fn collect_matches(
    el: ElementRef<'_>,
    selector: &Selector,
    elements: &[NodeId],
    cursor: &mut usize,
    out: &mut Vec<NodeId>,
) {
    let Some(&id) = elements.get(*cursor) else {
        return;
    };
    *cursor += 1;
    if selector.matches(&el) {
        out.push(id);
    }
    for child in el.children().filter_map(ElementRef::wrap) {
        if !is_hidden(child.value().name()) {
            collect_matches(child, selector, elements, cursor, out);
        }
    }
}

impl DomTree for Document {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slots.get(node.0).and_then(|slot| slot.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.slots
            .get(node.0)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    fn kind(&self, node: NodeId) -> NodeKind<'_> {
        match &self.slot(node).data {
            NodeData::Element { tag, .. } => NodeKind::Element(tag),
            NodeData::Text(text) => NodeKind::Text(text),
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.slots.get(node.0)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| ExtractionError::InvalidSelector(format!("{}: {:?}", selector, e)))?;

        if self.source.is_empty() {
            return Ok(Vec::new());
        }

        // The arena keeps no parser state, so matching runs on a fresh parse
        // whose element order is identical to the one the arena was built from.
        let html = Html::parse_document(&self.source);
        let mut out = Vec::new();
        let mut cursor = 0;
        collect_matches(
            html.root_element(),
            &parsed,
            &self.elements,
            &mut cursor,
            &mut out,
        );
        Ok(out)
    }
}
