//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` owned by the [`Document`] and are addressed
//! by [`NodeId`]. Each node owns the ordered list of its children; the
//! parent link is a plain id used for lookups only.

use std::ops::Range;

use crate::node::{LineSpan, NodeKind, NodeValue};
use crate::walk::{WalkEvent, WalkStatus, walk};

/// Index of a node inside its [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single element of the document tree.
#[derive(Clone, Debug)]
pub struct Node {
    value: NodeValue,
    source_range: Range<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// The node's payload.
    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    /// Byte range of the source this node was parsed from.
    pub fn source_range(&self) -> Range<usize> {
        self.source_range.clone()
    }
}

/// A parsed markdown document.
#[derive(Clone, Debug)]
pub struct Document {
    source: String,
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document holding only the root node.
    #[must_use]
    pub fn new(source: String) -> Self {
        let root = Node {
            value: NodeValue::Document,
            source_range: 0..source.len(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            source,
            nodes: vec![root],
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The source text the tree was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn value(&self, id: NodeId) -> &NodeValue {
        &self.nodes[id.0].value
    }

    /// Mutable access to a node's payload.
    ///
    /// Callers must not change the node's kind; use [`replace`](Self::replace)
    /// to retype a node.
    pub fn value_mut(&mut self, id: NodeId) -> &mut NodeValue {
        &mut self.nodes[id.0].value
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].value.kind()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = position(siblings, id)?;
        siblings.get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = position(siblings, id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let siblings = self.children(self.parent(id)?);
        position(siblings, id)
    }

    /// Allocate a new node and append it to `parent`'s children.
    pub fn append_child(
        &mut self,
        parent: NodeId,
        value: NodeValue,
        source_range: Range<usize>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            source_range,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Replace `old` with a new node carrying `value`.
    ///
    /// The new node takes `old`'s slot in its parent's child list and its
    /// source range, and adopts `old`'s children. `old` stays in the arena
    /// but is detached. The root cannot be replaced; passing it returns the
    /// root unchanged.
    pub fn replace(&mut self, old: NodeId, value: NodeValue) -> NodeId {
        let Some(parent) = self.parent(old) else {
            tracing::debug!(?old, "refusing to replace a detached or root node");
            return old;
        };
        let Some(index) = self.index_in_parent(old) else {
            return old;
        };

        let id = NodeId(self.nodes.len());
        let source_range = self.nodes[old.0].source_range();
        let children = std::mem::take(&mut self.nodes[old.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(Node {
            value,
            source_range,
            parent: Some(parent),
            children,
        });
        self.nodes[parent.0].children[index] = id;
        self.nodes[old.0].parent = None;
        id
    }

    /// Allocate a new node and insert it right before `anchor`.
    ///
    /// Returns `None` when `anchor` is the root or detached.
    pub fn insert_before(
        &mut self,
        anchor: NodeId,
        value: NodeValue,
        source_range: Range<usize>,
    ) -> Option<NodeId> {
        let parent = self.parent(anchor)?;
        let index = self.index_in_parent(anchor)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            source_range,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.insert(index, id);
        Some(id)
    }

    /// Remove `id` from its parent's child list. The node and its subtree
    /// stay in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|&child| child != id);
        self.nodes[id.0].parent = None;
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a raw content span to its text.
    pub fn span_text<'a>(&'a self, span: &'a LineSpan) -> &'a str {
        match span {
            LineSpan::Source(range) => self.source.get(range.clone()).unwrap_or_default(),
            LineSpan::Synthetic(text) => text,
        }
    }

    /// Concatenate a sequence of raw content spans.
    pub fn lines_text(&self, lines: &[LineSpan]) -> String {
        lines.iter().map(|span| self.span_text(span)).collect()
    }

    /// Flatten the text-bearing descendants of `id` into plain text.
    ///
    /// Text, inline code and math contribute their content; line breaks
    /// become a single space; raw HTML is dropped.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        let _ = walk(self, id, |event| {
            if let WalkEvent::Enter(node) = event {
                match self.value(node) {
                    NodeValue::Text(t)
                    | NodeValue::Code(t)
                    | NodeValue::InlineMath(t)
                    | NodeValue::DisplayMath(t) => text.push_str(t),
                    NodeValue::SoftBreak | NodeValue::HardBreak => text.push(' '),
                    _ => {}
                }
            }
            Ok::<_, std::convert::Infallible>(WalkStatus::Continue)
        });
        text
    }

    /// Install the source text once the tree has been built from it.
    pub(crate) fn attach_source(&mut self, source: String) {
        self.nodes[0].source_range = 0..source.len();
        self.source = source;
    }

    /// Append `text` to the last child of `parent` when that child is a text
    /// node. Returns `false` when there is no such child.
    pub(crate) fn merge_text(&mut self, parent: NodeId, text: &str, range: &Range<usize>) -> bool {
        let Some(&last) = self.nodes[parent.0].children.last() else {
            return false;
        };
        let node = &mut self.nodes[last.0];
        let NodeValue::Text(existing) = &mut node.value else {
            return false;
        };
        existing.push_str(text);
        node.source_range.end = node.source_range.end.max(range.end);
        true
    }

    pub(crate) fn lines_mut(&mut self, id: NodeId) -> Option<&mut Vec<LineSpan>> {
        self.nodes[id.0].value.lines_mut()
    }
}

fn position(siblings: &[NodeId], id: NodeId) -> Option<usize> {
    siblings.iter().position(|&child| child == id)
}
