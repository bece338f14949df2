//! Container markup for diagram blocks.

use std::fmt::Write;

use md2html_ast::{Document, NodeId, WalkStatus};
use md2html_renderer::{NodeRenderer, push_escaped};

use crate::consts::CONTAINER_CLASS;

/// Renders diagram blocks as `<pre class="mermaid">` with the escaped
/// diagram source.
///
/// The mermaid client script replaces the container with the drawn diagram
/// in the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiagramBlockRenderer;

impl NodeRenderer for DiagramBlockRenderer {
    fn render(
        &self,
        out: &mut String,
        doc: &Document,
        node: NodeId,
        entering: bool,
    ) -> WalkStatus {
        if entering {
            let _ = write!(out, r#"<pre class="{CONTAINER_CLASS}">"#);
            for span in doc.value(node).lines().unwrap_or_default() {
                push_escaped(out, doc.span_text(span));
            }
        } else {
            out.push_str("</pre>\n");
        }
        WalkStatus::Continue
    }
}
