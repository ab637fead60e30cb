//! Candidate scanner
//!
//! Turns a page into an ordered list of scan units, and each unit into text
//! spans paired with the element they were found in. The scanner only reads
//! the tree; all candidate work happens downstream.

use crate::config::ScanConfig;
use crate::dom::DomTree;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, instrument, warn};

/// How a page is scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// One unit per repeating list item
    Structured,
    /// Text-node walk of the whole body
    Generic,
    /// Whole page text in a single pass, body as the only anchor
    Oversized,
}

/// One chunk of scheduler work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanUnit<N> {
    /// A list item container; its rendered text is a single span
    Container(N),
    /// A subtree walked text node by text node
    Subtree(N),
    /// Pre-rendered text with one anchor for everything in it
    WholeText {
        /// Anchor for every candidate in the text
        anchor: N,
        /// Rendered page text
        text: String,
    },
}

/// A piece of page text and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan<'a, N> {
    /// Text content
    pub text: Cow<'a, str>,
    /// Smallest enclosing element, start of the proximity search
    pub anchor: N,
}

/// The ordered units of one page
#[derive(Debug, Clone)]
pub struct ScanPlan<N> {
    mode: ScanMode,
    units: Vec<ScanUnit<N>>,
}

impl<N: Copy> ScanPlan<N> {
    /// Decide how to scan `tree`
    ///
    /// The first structured selector with at least one hit wins. Without one
    /// the page is walked generically, unless its rendered text is larger
    /// than the oversized threshold.
    #[instrument(skip_all)]
    pub fn for_tree<T>(tree: &T, config: &ScanConfig) -> Self
    where
        T: DomTree<Node = N>,
    {
        for selector in &config.structured_selectors {
            match tree.query_all(selector) {
                Ok(containers) if !containers.is_empty() => {
                    debug!(
                        "Structured page: {} containers match {}",
                        containers.len(),
                        selector
                    );
                    return Self {
                        mode: ScanMode::Structured,
                        units: containers.into_iter().map(ScanUnit::Container).collect(),
                    };
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping structured selector: {}", e),
            }
        }

        let root = tree.scan_root();
        let text = tree.text_of(root);
        if text.len() > config.oversized_text_bytes {
            debug!("Oversized page: {} bytes of text", text.len());
            return Self {
                mode: ScanMode::Oversized,
                units: vec![ScanUnit::WholeText { anchor: root, text }],
            };
        }

        Self {
            mode: ScanMode::Generic,
            units: vec![ScanUnit::Subtree(root)],
        }
    }

    /// Scan mode chosen for the page
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Units in document order
    pub fn units(&self) -> &[ScanUnit<N>] {
        &self.units
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether there is nothing to scan
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<N: Copy> ScanUnit<N> {
    /// Text spans of this unit in document order
    ///
    /// Spans shorter than `min_chars` characters are dropped.
    pub fn spans<'a, T>(&'a self, tree: &'a T, min_chars: usize) -> Vec<TextSpan<'a, N>>
    where
        T: DomTree<Node = N>,
    {
        let long_enough = |text: &str| text.chars().nth(min_chars.saturating_sub(1)).is_some();

        match self {
            ScanUnit::Container(node) => {
                let text = tree.text_of(*node);
                if min_chars > 0 && !long_enough(&text) {
                    return Vec::new();
                }
                vec![TextSpan {
                    text: Cow::Owned(text),
                    anchor: *node,
                }]
            }
            ScanUnit::Subtree(node) => tree
                .text_nodes(*node)
                .filter(|t| min_chars == 0 || long_enough(t.text))
                .map(|t| TextSpan {
                    text: Cow::Borrowed(t.text),
                    anchor: t.parent,
                })
                .collect(),
            ScanUnit::WholeText { anchor, text } => {
                if min_chars > 0 && !long_enough(text) {
                    return Vec::new();
                }
                vec![TextSpan {
                    text: Cow::Borrowed(text.as_str()),
                    anchor: *anchor,
                }]
            }
        }
    }
}
