//! Build a [`Document`] from `pulldown-cmark` events.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::document::{Document, NodeId};
use crate::node::{
    Alignment, LineSpan, NodeCodeBlock, NodeFencedCodeBlock, NodeHeading, NodeImage, NodeLink,
    NodeValue, heading_level_to_num,
};

/// Markdown dialect switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// Tables, strikethrough, task lists, GitHub alerts and bare URL
    /// autolinks.
    pub gfm: bool,
    /// `$inline$` and `$$display$$` math.
    pub math: bool,
    /// `[^note]` footnotes.
    pub footnotes: bool,
    /// `# Heading {#id .class}` attributes.
    pub heading_attributes: bool,
    /// `:shortcode:` emoji. Applied after parsing.
    pub emoji: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            math: false,
            footnotes: true,
            heading_attributes: true,
            emoji: true,
        }
    }
}

impl ParseOptions {
    /// Parser options for `pulldown-cmark`.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM;
        }
        if self.math {
            options |= Options::ENABLE_MATH;
        }
        if self.footnotes {
            options |= Options::ENABLE_FOOTNOTES;
        }
        if self.heading_attributes {
            options |= Options::ENABLE_HEADING_ATTRIBUTES;
        }
        options
    }
}

/// Parse markdown into a document tree.
pub fn parse(source: impl Into<String>, options: &ParseOptions) -> Document {
    let source = source.into();
    let mut doc = Document::new(String::new());
    let mut builder = TreeBuilder::new(&mut doc);
    for (event, range) in Parser::new_ext(&source, options.parser_options()).into_offset_iter() {
        builder.push(event, range, &source);
    }
    doc.attach_source(source);
    tracing::debug!(nodes = doc.node_count(), bytes = doc.source().len(), "Parsed markdown");
    doc
}

/// Incremental tree construction from a flat event stream.
struct TreeBuilder<'d> {
    doc: &'d mut Document,
    /// Open containers, innermost last.
    open: Vec<NodeId>,
    /// Code block currently receiving text.
    code: Option<NodeId>,
}

impl<'d> TreeBuilder<'d> {
    fn new(doc: &'d mut Document) -> Self {
        let root = doc.root();
        Self {
            doc,
            open: vec![root],
            code: None,
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn push(&mut self, event: Event<'_>, range: Range<usize>, source: &str) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(code) = self.code {
                    let span = line_span(text, range, source);
                    if let Some(lines) = self.doc.lines_mut(code) {
                        lines.push(span);
                    }
                } else {
                    // The parser splits text at markup candidates; adjacent
                    // pieces are kept as one node.
                    let parent = self.current();
                    if !self.doc.merge_text(parent, &text, &range) {
                        self.leaf(NodeValue::Text(text.into_string()), range);
                    }
                }
            }
            Event::Code(code) => self.leaf(NodeValue::Code(code.into_string()), range),
            Event::InlineMath(math) => self.leaf(NodeValue::InlineMath(math.into_string()), range),
            Event::DisplayMath(math) => {
                self.leaf(NodeValue::DisplayMath(math.into_string()), range);
            }
            Event::Html(html) => self.leaf(NodeValue::Html(html.into_string()), range),
            Event::InlineHtml(html) => self.leaf(NodeValue::InlineHtml(html.into_string()), range),
            Event::FootnoteReference(name) => {
                self.leaf(NodeValue::FootnoteReference(name.into_string()), range);
            }
            Event::SoftBreak => self.leaf(NodeValue::SoftBreak, range),
            Event::HardBreak => self.leaf(NodeValue::HardBreak, range),
            Event::Rule => self.leaf(NodeValue::Rule, range),
            Event::TaskListMarker(checked) => self.leaf(NodeValue::TaskListMarker(checked), range),
        }
    }

    fn leaf(&mut self, value: NodeValue, range: Range<usize>) {
        let parent = self.current();
        self.doc.append_child(parent, value, range);
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let value = match tag {
            Tag::Paragraph => NodeValue::Paragraph,
            Tag::Heading {
                level, id, classes, ..
            } => NodeValue::Heading(NodeHeading {
                level: heading_level_to_num(level),
                id: id.map(CowStr::into_string),
                classes: classes.into_iter().map(CowStr::into_string).collect(),
            }),
            Tag::BlockQuote(kind) => NodeValue::BlockQuote(kind.map(Into::into)),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                NodeValue::FencedCodeBlock(NodeFencedCodeBlock {
                    info: info.into_string(),
                    lines: Vec::new(),
                })
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => NodeValue::CodeBlock(NodeCodeBlock {
                lines: Vec::new(),
            }),
            Tag::HtmlBlock => NodeValue::HtmlBlock,
            Tag::List(start) => NodeValue::List(start),
            Tag::Item => NodeValue::Item,
            Tag::FootnoteDefinition(name) => NodeValue::FootnoteDefinition(name.into_string()),
            Tag::DefinitionList => NodeValue::DefinitionList,
            Tag::DefinitionListTitle => NodeValue::DefinitionListTitle,
            Tag::DefinitionListDefinition => NodeValue::DefinitionListDefinition,
            Tag::Table(alignments) => {
                NodeValue::Table(alignments.into_iter().map(Alignment::from).collect())
            }
            Tag::TableHead => NodeValue::TableHead,
            Tag::TableRow => NodeValue::TableRow,
            Tag::TableCell => NodeValue::TableCell,
            Tag::Emphasis => NodeValue::Emphasis,
            Tag::Strong => NodeValue::Strong,
            Tag::Strikethrough => NodeValue::Strikethrough,
            Tag::Superscript => NodeValue::Superscript,
            Tag::Subscript => NodeValue::Subscript,
            Tag::Link {
                dest_url, title, ..
            } => NodeValue::Link(NodeLink {
                destination: dest_url.into_string(),
                title: title.into_string(),
            }),
            Tag::Image {
                dest_url, title, ..
            } => NodeValue::Image(NodeImage {
                destination: dest_url.into_string(),
                title: title.into_string(),
            }),
            Tag::MetadataBlock(_) => NodeValue::MetadataBlock,
        };

        let is_code = matches!(
            value,
            NodeValue::CodeBlock(_) | NodeValue::FencedCodeBlock(_)
        );
        let parent = self.current();
        let id = self.doc.append_child(parent, value, range);
        if is_code {
            self.code = Some(id);
        }
        self.open.push(id);
    }

    fn end(&mut self, tag: TagEnd) {
        if tag == TagEnd::CodeBlock {
            self.code = None;
        }
        // The root is never closed by an event.
        if self.open.len() > 1 {
            self.open.pop();
        }
    }
}

/// Reference the source when the parser handed us a verbatim slice of it.
fn line_span(text: CowStr<'_>, range: Range<usize>, source: &str) -> LineSpan {
    if source.get(range.clone()) == Some(&*text) {
        LineSpan::Source(range)
    } else {
        LineSpan::Synthetic(text.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{AlertKind, NodeKind};
    use pretty_assertions::assert_eq;

    fn kinds(doc: &Document, id: NodeId) -> Vec<NodeKind> {
        doc.children(id).iter().map(|&c| doc.kind(c)).collect()
    }

    #[test]
    fn test_parse_heading_and_paragraph() {
        let doc = parse("# Hello *World*\n\nBody text\n", &ParseOptions::default());
        let root = doc.root();
        assert_eq!(kinds(&doc, root), vec![NodeKind::Heading, NodeKind::Paragraph]);

        let heading = doc.children(root)[0];
        let NodeValue::Heading(h) = doc.value(heading) else {
            panic!("expected heading");
        };
        assert_eq!(h.level, 1);
        assert_eq!(kinds(&doc, heading), vec![NodeKind::Text, NodeKind::Emphasis]);
        assert_eq!(doc.text_content(heading), "Hello World");
        assert_eq!(doc.parent(heading), Some(root));
    }

    #[test]
    fn test_parse_merges_adjacent_text() {
        let doc = parse("a_b [c d_e\\* :smile_cat:\n", &ParseOptions::default());
        let para = doc.children(doc.root())[0];
        assert_eq!(kinds(&doc, para), vec![NodeKind::Text]);
        assert_eq!(
            doc.value(doc.children(para)[0]),
            &NodeValue::Text("a_b [c d_e* :smile_cat:".to_owned())
        );
    }

    #[test]
    fn test_parse_heading_attributes() {
        let doc = parse("## Install {#setup .wide}\n", &ParseOptions::default());
        let heading = doc.children(doc.root())[0];
        let NodeValue::Heading(h) = doc.value(heading) else {
            panic!("expected heading");
        };
        assert_eq!(h.id.as_deref(), Some("setup"));
        assert_eq!(h.classes, vec!["wide".to_owned()]);
        assert_eq!(doc.text_content(heading), "Install");
    }

    #[test]
    fn test_parse_fenced_code_lines_reference_source() {
        let source = "```rust\nfn main() {}\nlet x = 1;\n```\n";
        let doc = parse(source, &ParseOptions::default());
        let block = doc.children(doc.root())[0];
        let NodeValue::FencedCodeBlock(code) = doc.value(block) else {
            panic!("expected fenced code block");
        };
        assert_eq!(code.info, "rust");
        assert!(
            code.lines
                .iter()
                .all(|span| matches!(span, LineSpan::Source(_)))
        );
        assert_eq!(doc.lines_text(&code.lines), "fn main() {}\nlet x = 1;\n");
        assert!(doc.children(block).is_empty());
    }

    #[test]
    fn test_parse_fenced_code_inside_list() {
        let source = "- item\n\n  ```mermaid\n  graph TD\n  A-->B\n  ```\n";
        let doc = parse(source, &ParseOptions::default());
        let list = doc.children(doc.root())[0];
        let item = doc.children(list)[0];
        let block = *doc
            .children(item)
            .iter()
            .find(|&&c| doc.kind(c) == NodeKind::FencedCodeBlock)
            .unwrap();
        let lines = doc.value(block).lines().unwrap();
        assert_eq!(doc.lines_text(lines), "graph TD\nA-->B\n");
    }

    #[test]
    fn test_parse_indented_code() {
        let doc = parse("    indented\n", &ParseOptions::default());
        let block = doc.children(doc.root())[0];
        assert_eq!(doc.kind(block), NodeKind::CodeBlock);
        assert_eq!(doc.lines_text(doc.value(block).lines().unwrap()), "indented\n");
    }

    #[test]
    fn test_parse_image() {
        let doc = parse("![a *b*](img/x.png \"T\")\n", &ParseOptions::default());
        let para = doc.children(doc.root())[0];
        let image = doc.children(para)[0];
        let NodeValue::Image(img) = doc.value(image) else {
            panic!("expected image");
        };
        assert_eq!(img.destination, "img/x.png");
        assert_eq!(img.title, "T");
        assert_eq!(doc.text_content(image), "a b");
    }

    #[test]
    fn test_parse_table_and_alert() {
        let source = "| A | B |\n|:--|--:|\n| 1 | 2 |\n\n> [!WARNING]\n> Careful\n";
        let doc = parse(source, &ParseOptions::default());
        let root = doc.root();
        let children = doc.children(root);
        assert_eq!(
            doc.value(children[0]),
            &NodeValue::Table(vec![Alignment::Left, Alignment::Right])
        );
        assert_eq!(
            kinds(&doc, children[0]),
            vec![NodeKind::TableHead, NodeKind::TableRow]
        );
        assert_eq!(
            doc.value(children[1]),
            &NodeValue::BlockQuote(Some(AlertKind::Warning))
        );
    }

    #[test]
    fn test_parse_without_gfm() {
        let options = ParseOptions {
            gfm: false,
            ..ParseOptions::default()
        };
        let doc = parse("| A | B |\n|---|---|\n| 1 | 2 |\n", &options);
        assert_eq!(kinds(&doc, doc.root()), vec![NodeKind::Paragraph]);
    }

    #[test]
    fn test_parse_math_only_when_enabled() {
        let doc = parse("$x$\n", &ParseOptions::default());
        let para = doc.children(doc.root())[0];
        assert!(kinds(&doc, para).iter().all(|&kind| kind == NodeKind::Text));

        let options = ParseOptions {
            math: true,
            ..ParseOptions::default()
        };
        let doc = parse("$x$\n", &options);
        let para = doc.children(doc.root())[0];
        assert_eq!(kinds(&doc, para), vec![NodeKind::InlineMath]);
    }

    #[test]
    fn test_parse_html_block_is_raw_lines() {
        let doc = parse("<div>\nhi\n</div>\n", &ParseOptions::default());
        let block = doc.children(doc.root())[0];
        assert_eq!(doc.kind(block), NodeKind::HtmlBlock);
        assert!(
            kinds(&doc, block)
                .iter()
                .all(|&kind| kind == NodeKind::Html)
        );
    }

    #[test]
    fn test_parser_options() {
        let options = ParseOptions::default().parser_options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_GFM));
        assert!(options.contains(Options::ENABLE_HEADING_ATTRIBUTES));
        assert!(options.contains(Options::ENABLE_FOOTNOTES));
        assert!(!options.contains(Options::ENABLE_MATH));
    }
}
