//! HTML rendering of a document tree.
//!
//! [`HtmlRenderer`] walks the tree and writes HTML for every node. Rendering
//! of a node kind can be taken over by registering a [`NodeRenderer`] for it.

use std::collections::HashMap;
use std::fmt::Write;

use md2html_ast::{
    Alignment, Document, LineSpan, NodeId, NodeKind, NodeValue, WalkEvent, WalkStatus, walk,
};

use crate::state::{Footnotes, HeadingIds};
use crate::util::{escape_html, push_escaped};

/// Render extension for one node kind.
///
/// Called with `entering == true` before the node's children and with
/// `entering == false` after them. The returned status steers the walk; for
/// raw node kinds the renderer never descends into children regardless of
/// the returned status.
pub trait NodeRenderer {
    fn render(&self, out: &mut String, doc: &Document, node: NodeId, entering: bool)
    -> WalkStatus;
}

/// Tree to HTML renderer.
///
/// The renderer itself holds only the render-dispatch registry; per-render
/// state (heading ids, footnote numbers) is created for every call to
/// [`render`](Self::render), so one renderer can be shared between threads.
#[derive(Default)]
pub struct HtmlRenderer {
    renderers: HashMap<NodeKind, Box<dyn NodeRenderer + Send + Sync>>,
}

impl HtmlRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer for `kind`, replacing the built-in rendering.
    #[must_use]
    pub fn with_node_renderer<R>(mut self, kind: NodeKind, renderer: R) -> Self
    where
        R: NodeRenderer + Send + Sync + 'static,
    {
        self.renderers.insert(kind, Box::new(renderer));
        self
    }

    /// Whether a custom renderer is registered for `kind`.
    pub fn has_node_renderer(&self, kind: NodeKind) -> bool {
        self.renderers.contains_key(&kind)
    }

    /// Render the whole document.
    pub fn render(&self, doc: &Document) -> String {
        let mut out = String::with_capacity(4096);
        let mut builtin = Builtin::default();

        let _ = walk(doc, doc.root(), |event| {
            let (node, entering) = match event {
                WalkEvent::Enter(id) => (id, true),
                WalkEvent::Leave(id) => (id, false),
            };
            let kind = doc.kind(node);
            let status = match self.renderers.get(&kind) {
                Some(renderer) => renderer.render(&mut out, doc, node, entering),
                None if entering => builtin.enter(&mut out, doc, node),
                None => {
                    builtin.leave(&mut out, doc, node);
                    WalkStatus::Continue
                }
            };
            if entering && kind.is_raw() && status == WalkStatus::Continue {
                return Ok::<_, std::convert::Infallible>(WalkStatus::SkipChildren);
            }
            Ok(status)
        });

        out
    }
}

/// Built-in markup for every node kind.
#[derive(Default)]
struct Builtin {
    headings: HeadingIds,
    footnotes: Footnotes,
}

impl Builtin {
    #[allow(clippy::too_many_lines)]
    fn enter(&mut self, out: &mut String, doc: &Document, node: NodeId) -> WalkStatus {
        match doc.value(node) {
            NodeValue::Document | NodeValue::MetadataBlock => {}
            NodeValue::Paragraph => out.push_str("<p>"),
            NodeValue::Heading(heading) => {
                let text = doc.text_content(node);
                let id = self.headings.next(heading.id.as_deref(), &text);
                let _ = write!(out, r#"<h{} id="{}""#, heading.level, escape_html(&id));
                if !heading.classes.is_empty() {
                    let _ = write!(out, r#" class="{}""#, escape_html(&heading.classes.join(" ")));
                }
                out.push('>');
            }
            NodeValue::BlockQuote(None) => out.push_str("<blockquote>\n"),
            NodeValue::BlockQuote(Some(kind)) => {
                let _ = write!(
                    out,
                    "<div class=\"markdown-alert markdown-alert-{}\">\n<p class=\"markdown-alert-title\">{}</p>\n",
                    kind.as_str(),
                    kind.title()
                );
            }
            NodeValue::CodeBlock(block) => {
                code_block(out, doc, None, &block.lines);
                return WalkStatus::SkipChildren;
            }
            NodeValue::FencedCodeBlock(block) => {
                code_block(out, doc, block.language(), &block.lines);
                return WalkStatus::SkipChildren;
            }
            NodeValue::DiagramBlock(block) => {
                tracing::debug!(?node, "No diagram renderer registered, rendering as code");
                code_block(out, doc, None, &block.lines);
                return WalkStatus::SkipChildren;
            }
            NodeValue::HtmlBlock => {
                for &child in doc.children(node) {
                    if let NodeValue::Html(html) = doc.value(child) {
                        out.push_str(html);
                    }
                }
                return WalkStatus::SkipChildren;
            }
            NodeValue::List(None) => out.push_str("<ul>\n"),
            NodeValue::List(Some(1)) => out.push_str("<ol>\n"),
            NodeValue::List(Some(start)) => {
                let _ = writeln!(out, r#"<ol start="{start}">"#);
            }
            NodeValue::Item => out.push_str("<li>"),
            NodeValue::FootnoteDefinition(name) => {
                let number = self.footnotes.number(name);
                let _ = writeln!(
                    out,
                    r#"<div class="footnote-definition" id="fn-{}"><sup class="footnote-definition-label">{number}</sup>"#,
                    escape_html(name)
                );
            }
            NodeValue::DefinitionList => out.push_str("<dl>\n"),
            NodeValue::DefinitionListTitle => out.push_str("<dt>"),
            NodeValue::DefinitionListDefinition => out.push_str("<dd>"),
            NodeValue::Table(_) => out.push_str("<table>\n"),
            NodeValue::TableHead => out.push_str("<thead>\n<tr>"),
            NodeValue::TableRow => out.push_str("<tr>"),
            NodeValue::TableCell => {
                let tag = cell_tag(doc, node);
                let _ = write!(out, "<{tag}{}>", alignment_style(doc, node));
            }
            NodeValue::Emphasis => out.push_str("<em>"),
            NodeValue::Strong => out.push_str("<strong>"),
            NodeValue::Strikethrough => out.push_str("<del>"),
            NodeValue::Superscript => out.push_str("<sup>"),
            NodeValue::Subscript => out.push_str("<sub>"),
            NodeValue::Link(link) => {
                let _ = write!(out, r#"<a href="{}""#, escape_html(&link.destination));
                title_attr(out, &link.title);
                out.push('>');
            }
            NodeValue::Image(image) => {
                let alt = doc.text_content(node);
                let _ = write!(
                    out,
                    r#"<img src="{}" alt="{}""#,
                    escape_html(&image.destination),
                    escape_html(&alt)
                );
                title_attr(out, &image.title);
                out.push('>');
                return WalkStatus::SkipChildren;
            }
            NodeValue::Text(text) => push_escaped(out, text),
            NodeValue::Code(code) => {
                out.push_str("<code>");
                push_escaped(out, code);
                out.push_str("</code>");
            }
            NodeValue::Html(html) | NodeValue::InlineHtml(html) => out.push_str(html),
            NodeValue::InlineMath(math) => {
                out.push_str(r"\(");
                push_escaped(out, math);
                out.push_str(r"\)");
            }
            NodeValue::DisplayMath(math) => {
                out.push_str(r"\[");
                push_escaped(out, math);
                out.push_str(r"\]");
            }
            NodeValue::FootnoteReference(name) => {
                let number = self.footnotes.number(name);
                let _ = write!(
                    out,
                    r##"<sup class="footnote-reference"><a href="#fn-{}">{number}</a></sup>"##,
                    escape_html(name)
                );
            }
            NodeValue::SoftBreak => out.push('\n'),
            NodeValue::HardBreak => out.push_str("<br>\n"),
            NodeValue::Rule => out.push_str("<hr>\n"),
            NodeValue::TaskListMarker(true) => {
                out.push_str(r#"<input type="checkbox" checked disabled> "#);
            }
            NodeValue::TaskListMarker(false) => out.push_str(r#"<input type="checkbox" disabled> "#),
        }
        WalkStatus::Continue
    }

    fn leave(&mut self, out: &mut String, doc: &Document, node: NodeId) {
        match doc.value(node) {
            NodeValue::Paragraph => out.push_str("</p>\n"),
            NodeValue::Heading(heading) => {
                let _ = writeln!(out, "</h{}>", heading.level);
            }
            NodeValue::BlockQuote(None) => out.push_str("</blockquote>\n"),
            NodeValue::BlockQuote(Some(_)) | NodeValue::FootnoteDefinition(_) => {
                out.push_str("</div>\n");
            }
            NodeValue::List(None) => out.push_str("</ul>\n"),
            NodeValue::List(Some(_)) => out.push_str("</ol>\n"),
            NodeValue::Item => out.push_str("</li>\n"),
            NodeValue::DefinitionList => out.push_str("</dl>\n"),
            NodeValue::DefinitionListTitle => out.push_str("</dt>\n"),
            NodeValue::DefinitionListDefinition => out.push_str("</dd>\n"),
            NodeValue::Table(_) => out.push_str("</tbody>\n</table>\n"),
            NodeValue::TableHead => out.push_str("</tr>\n</thead>\n<tbody>\n"),
            NodeValue::TableRow => out.push_str("</tr>\n"),
            NodeValue::TableCell => {
                let _ = write!(out, "</{}>", cell_tag(doc, node));
            }
            NodeValue::Emphasis => out.push_str("</em>"),
            NodeValue::Strong => out.push_str("</strong>"),
            NodeValue::Strikethrough => out.push_str("</del>"),
            NodeValue::Superscript => out.push_str("</sup>"),
            NodeValue::Subscript => out.push_str("</sub>"),
            NodeValue::Link(_) => out.push_str("</a>"),
            _ => {}
        }
    }
}

fn code_block(out: &mut String, doc: &Document, language: Option<&str>, lines: &[LineSpan]) {
    match language {
        Some(lang) => {
            let _ = write!(out, r#"<pre><code class="language-{}">"#, escape_html(lang));
        }
        None => out.push_str("<pre><code>"),
    }
    for span in lines {
        push_escaped(out, doc.span_text(span));
    }
    out.push_str("</code></pre>\n");
}

fn title_attr(out: &mut String, title: &str) {
    if !title.is_empty() {
        let _ = write!(out, r#" title="{}""#, escape_html(title));
    }
}

/// Header cells sit directly under the table head.
fn cell_tag(doc: &Document, cell: NodeId) -> &'static str {
    match doc.parent(cell).map(|parent| doc.kind(parent)) {
        Some(NodeKind::TableHead) => "th",
        _ => "td",
    }
}

fn alignment_style(doc: &Document, cell: NodeId) -> &'static str {
    let table = doc.parent(cell).and_then(|row| doc.parent(row));
    let alignment = match (table.map(|t| doc.value(t)), doc.index_in_parent(cell)) {
        (Some(NodeValue::Table(alignments)), Some(index)) => alignments.get(index).copied(),
        _ => None,
    };
    match alignment {
        Some(Alignment::Left) => r#" style="text-align:left""#,
        Some(Alignment::Center) => r#" style="text-align:center""#,
        Some(Alignment::Right) => r#" style="text-align:right""#,
        Some(Alignment::None) | None => "",
    }
}
