//! Turn `mermaid` fenced code blocks into diagram blocks.

use md2html_ast::{
    ConversionContext, Document, NodeDiagramBlock, NodeId, NodeValue, Stage, WalkEvent,
    WalkStatus, walk,
};

use crate::consts::{MERMAID_LANGUAGE, RECLASSIFY_PRIORITY};

/// Stage replacing fenced blocks tagged `mermaid` with diagram blocks.
///
/// Matching blocks are collected in one walk and replaced afterwards, so no
/// child list is edited while it is being traversed. The replacement keeps
/// the block's position and its line spans.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiagramReclassifier;

impl DiagramReclassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Stage for DiagramReclassifier {
    fn name(&self) -> &'static str {
        "diagram-reclassifier"
    }

    fn priority(&self) -> u32 {
        RECLASSIFY_PRIORITY
    }

    fn applies(&self, ctx: &ConversionContext) -> bool {
        ctx.diagrams()
    }

    fn transform(&self, doc: &mut Document, _ctx: &mut ConversionContext) {
        let targets = collect_diagram_blocks(doc);
        for &node in &targets {
            let Some(lines) = doc.value(node).lines().map(<[_]>::to_vec) else {
                continue;
            };
            doc.replace(node, NodeValue::DiagramBlock(NodeDiagramBlock { lines }));
        }
        tracing::debug!(count = targets.len(), "Reclassified diagram blocks");
    }
}

/// Fenced blocks whose language is exactly `mermaid`, in document order.
fn collect_diagram_blocks(doc: &Document) -> Vec<NodeId> {
    let mut targets = Vec::new();
    let _ = walk(doc, doc.root(), |event| {
        if let WalkEvent::Enter(node) = event
            && let NodeValue::FencedCodeBlock(block) = doc.value(node)
            && block.language() == Some(MERMAID_LANGUAGE)
        {
            targets.push(node);
        }
        Ok::<_, std::convert::Infallible>(WalkStatus::Continue)
    });
    targets
}
