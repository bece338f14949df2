//! Depth-first tree traversal.
//!
//! [`walk`] delivers an [`WalkEvent::Enter`] before a node's children and a
//! [`WalkEvent::Leave`] after them, in document order. The visitor steers the
//! traversal with [`WalkStatus`].
//!
//! The walker only borrows the document, so a visitor cannot restructure the
//! tree while it is being traversed. Stages that edit the tree collect the
//! nodes they care about first and apply the edits after the walk returns.

use crate::document::{Document, NodeId};

/// Visitation event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkEvent {
    /// Before the node's children.
    Enter(NodeId),
    /// After the node's children.
    Leave(NodeId),
}

impl WalkEvent {
    /// The node this event refers to.
    pub fn node(self) -> NodeId {
        match self {
            Self::Enter(id) | Self::Leave(id) => id,
        }
    }

    pub fn is_enter(self) -> bool {
        matches!(self, Self::Enter(_))
    }
}

/// Visitor decision after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// Keep going.
    Continue,
    /// Do not descend into the current node's children. Its `Leave` event is
    /// still delivered. Has no effect when returned from `Leave`.
    SkipChildren,
    /// Abort the whole traversal immediately.
    Stop,
}

/// Walk the subtree rooted at `root`.
///
/// The first error returned by `visit` aborts the traversal and is returned.
pub fn walk<F, E>(doc: &Document, root: NodeId, mut visit: F) -> Result<(), E>
where
    F: FnMut(WalkEvent) -> Result<WalkStatus, E>,
{
    let mut stack = vec![WalkEvent::Enter(root)];

    while let Some(event) = stack.pop() {
        let status = visit(event)?;
        if status == WalkStatus::Stop {
            return Ok(());
        }
        if let WalkEvent::Enter(id) = event {
            stack.push(WalkEvent::Leave(id));
            if status == WalkStatus::Continue {
                stack.extend(doc.children(id).iter().rev().map(|&c| WalkEvent::Enter(c)));
            }
        }
    }

    Ok(())
}
