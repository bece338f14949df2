//! Derive the document title from the first heading.

use md2html_ast::{ConversionContext, Document, NodeValue, Stage, WalkEvent, WalkStatus, walk};

/// Pipeline slot of the title extractor. Runs last so it sees the final tree.
pub const TITLE_PRIORITY: u32 = 900;

/// Stage offering the text of the first heading (any level) as the title.
///
/// Skipped when the caller already supplied a title.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitleExtractor;

impl Stage for TitleExtractor {
    fn name(&self) -> &'static str {
        "title-extractor"
    }

    fn priority(&self) -> u32 {
        TITLE_PRIORITY
    }

    fn applies(&self, ctx: &ConversionContext) -> bool {
        !ctx.has_title()
    }

    fn transform(&self, doc: &mut Document, ctx: &mut ConversionContext) {
        if let Some(title) = first_heading_text(doc) {
            tracing::debug!(%title, "Extracted title");
            ctx.offer_title(title);
        }
    }
}

/// Flattened text of the first heading in document order.
pub fn first_heading_text(doc: &Document) -> Option<String> {
    let mut title = None;
    let _ = walk(doc, doc.root(), |event| {
        if let WalkEvent::Enter(node) = event
            && matches!(doc.value(node), NodeValue::Heading(_))
        {
            title = Some(doc.text_content(node).trim().to_owned());
            return Ok::<_, std::convert::Infallible>(WalkStatus::Stop);
        }
        Ok(WalkStatus::Continue)
    });
    title
}
