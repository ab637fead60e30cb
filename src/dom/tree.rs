//! Tree navigation capability
//!
//! The scanner and associator only need a handful of operations on a page:
//! walk up, walk down, read text, and ask for elements of a known shape.
//! `DomTree` captures exactly that, so the engine can run over a parsed HTML
//! document, a live browser DOM, or a synthetic tree in tests.

use crate::error::Result;
use std::fmt::Debug;
use std::hash::Hash;

/// What a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// Element with its lower-case tag name
    Element(&'a str),
    /// Text node with its raw content
    Text(&'a str),
}

/// A text node found by [`DomTree::text_nodes`]
#[derive(Debug, Clone, Copy)]
pub struct TextNode<'a, N> {
    /// The text node itself
    pub node: N,
    /// Raw text content
    pub text: &'a str,
    /// Closest enclosing element
    pub parent: N,
}

/// Minimal read-only view of a rendered page
pub trait DomTree {
    /// Node handle; cheap to copy and usable as a map key
    type Node: Copy + Eq + Hash + Debug;

    /// Document element
    fn root(&self) -> Self::Node;

    /// `<body>` element, if the page has one
    fn body(&self) -> Option<Self::Node>;

    /// Parent of a node, `None` at the root
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Children in document order
    fn children(&self, node: Self::Node) -> &[Self::Node];

    /// Element or text
    fn kind(&self, node: Self::Node) -> NodeKind<'_>;

    /// Attribute value of an element
    fn attr(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// All elements matching a CSS selector, in document order
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>>;

    /// Where page-wide scans start: the body, or the root without one
    fn scan_root(&self) -> Self::Node {
        self.body().unwrap_or_else(|| self.root())
    }

    /// Tag name of an element node
    fn tag(&self, node: Self::Node) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Pre-order walk over `node` and everything below it
    fn descendants(&self, node: Self::Node) -> Descendants<'_, Self>
    where
        Self: Sized,
    {
        Descendants {
            tree: self,
            stack: vec![node],
        }
    }

    /// Document-order walk over the text nodes below `node`
    fn text_nodes(&self, node: Self::Node) -> TextNodes<'_, Self>
    where
        Self: Sized,
    {
        TextNodes {
            inner: self.descendants(node),
        }
    }

    /// Rendered text of a subtree, close to what `innerText` returns:
    /// whitespace collapsed outside `<pre>`, block elements on their own
    /// lines, table cells separated by tabs.
    fn text_of(&self, node: Self::Node) -> String
    where
        Self: Sized,
    {
        let mut out = String::new();
        let mut stack = vec![Visit::Enter(node, false)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(n, preformatted) => match self.kind(n) {
                    NodeKind::Text(text) if preformatted => out.push_str(text),
                    NodeKind::Text(text) => push_collapsed(&mut out, text),
                    NodeKind::Element("br") => push_break(&mut out, '\n'),
                    NodeKind::Element(tag) => {
                        if separator_after(tag) == Some('\n') {
                            push_break(&mut out, '\n');
                        }
                        let preformatted = preformatted || matches!(tag, "pre" | "textarea");
                        stack.push(Visit::Leave(n));
                        for &child in self.children(n).iter().rev() {
                            stack.push(Visit::Enter(child, preformatted));
                        }
                    }
                },
                Visit::Leave(n) => {
                    if let Some(sep) = self.tag(n).and_then(separator_after) {
                        push_break(&mut out, sep);
                    }
                }
            }
        }

        out.trim_matches(is_html_space).to_string()
    }
}

enum Visit<N> {
    Enter(N, bool),
    Leave(N),
}

/// Pre-order node iterator, see [`DomTree::descendants`]
pub struct Descendants<'a, T: DomTree> {
    tree: &'a T,
    stack: Vec<T::Node>,
}

impl<'a, T: DomTree> Iterator for Descendants<'a, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(node).iter().rev().copied());
        Some(node)
    }
}

/// Text node iterator, see [`DomTree::text_nodes`]
pub struct TextNodes<'a, T: DomTree> {
    inner: Descendants<'a, T>,
}

impl<'a, T: DomTree> Iterator for TextNodes<'a, T> {
    type Item = TextNode<'a, T::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.inner.tree;
        for node in self.inner.by_ref() {
            if let NodeKind::Text(text) = tree.kind(node) {
                let parent = tree.parent(node).unwrap_or(node);
                return Some(TextNode { node, text, parent });
            }
        }
        None
    }
}

/// Separator emitted after an element's content
fn separator_after(tag: &str) -> Option<char> {
    match tag {
        "td" | "th" => Some('\t'),
        "address" | "article" | "aside" | "blockquote" | "body" | "caption" | "dd"
        | "details" | "div" | "dl" | "dt" | "fieldset" | "figcaption" | "figure"
        | "footer" | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hr"
        | "html" | "li" | "main" | "nav" | "ol" | "option" | "p" | "pre" | "section"
        | "summary" | "table" | "tbody" | "thead" | "tfoot" | "tr" | "ul" => Some('\n'),
        _ => None,
    }
}

/// ASCII whitespace as HTML defines it; `&nbsp;` is content
fn is_html_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn push_collapsed(out: &mut String, text: &str) {
    let mut pending_space = false;
    for ch in text.chars() {
        if is_html_space(ch) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() && !out.ends_with(is_html_space) {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    if pending_space && !out.is_empty() && !out.ends_with(is_html_space) {
        out.push(' ');
    }
}

fn push_break(out: &mut String, sep: char) {
    while out.ends_with(' ') {
        out.pop();
    }
    if out.is_empty() || out.ends_with('\n') {
        return;
    }
    out.push(sep);
}
