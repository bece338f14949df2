//! Markdown to HTML conversion facade.

use std::borrow::Cow;

use md2html_ast::{ConversionContext, Document, NodeKind, ParseOptions, Pipeline, Stage, parse};
use md2html_diagrams::{DiagramBlockRenderer, DiagramReclassifier};
use md2html_renderer::HtmlRenderer;

use crate::autolink::Autolinker;
use crate::embed::ImageInliner;
use crate::emoji::EmojiReplacer;
use crate::title::TitleExtractor;

/// Result of converting one document.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// Rendered HTML fragment (the page body).
    pub html: String,
    /// Title supplied by the caller or extracted from the first heading.
    pub title: Option<String>,
    /// Non-fatal problems, such as images that could not be inlined.
    pub warnings: Vec<String>,
}

/// Parses markdown, runs the stage pipeline and renders HTML.
///
/// A converter holds no per-document state. Everything that changes during
/// a conversion lives in the [`ConversionContext`] passed to
/// [`convert`](Self::convert), so one converter can serve many conversions,
/// including concurrent ones with separate contexts.
pub struct Converter {
    options: ParseOptions,
    pipeline: Pipeline,
}

impl Converter {
    /// Create a converter with the standard stages: image inlining, diagram
    /// reclassification and title extraction, plus autolinking with `gfm`
    /// and shortcode replacement with `emoji`.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        let mut pipeline = Pipeline::new()
            .with_stage(ImageInliner)
            .with_stage(DiagramReclassifier::new())
            .with_stage(TitleExtractor);
        if options.gfm {
            pipeline.add(Autolinker::new());
        }
        if options.emoji {
            pipeline.add(EmojiReplacer);
        }
        Self { options, pipeline }
    }

    /// Register an additional stage.
    #[must_use]
    pub fn with_stage<S: Stage + Send + Sync + 'static>(mut self, stage: S) -> Self {
        self.pipeline.add(stage);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse markdown without running any stage.
    pub fn parse(&self, markdown: &str) -> Document {
        parse(normalize_newlines(markdown), &self.options)
    }

    /// Convert a markdown document.
    pub fn convert(&self, markdown: &str, ctx: &mut ConversionContext) -> Conversion {
        let mut doc = self.parse(markdown);
        self.pipeline.run(&mut doc, ctx);

        let mut renderer = HtmlRenderer::new();
        if ctx.diagrams() {
            renderer = renderer.with_node_renderer(NodeKind::DiagramBlock, DiagramBlockRenderer);
        }
        let html = renderer.render(&doc);

        tracing::debug!(
            bytes = html.len(),
            warnings = ctx.warnings().len(),
            "Converted document"
        );

        Conversion {
            html,
            title: ctx.title().map(ToOwned::to_owned),
            warnings: ctx.warnings().to_vec(),
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

/// Turn CRLF and lone CR line endings into LF.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}
