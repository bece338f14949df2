//! Node values stored in the document tree.
//!
//! [`NodeValue`] carries the per-kind payload of a node, [`NodeKind`] is its
//! field-less discriminant used for render dispatch.

use std::ops::Range;

use pulldown_cmark::{BlockQuoteKind, HeadingLevel};

/// A piece of raw block content.
///
/// Spans normally point into the document source. The parser occasionally
/// synthesizes text that has no verbatim counterpart in the source (for
/// example spaces produced by tab expansion inside a container); such text
/// is kept as an owned string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineSpan {
    /// Byte range into the document source.
    Source(Range<usize>),
    /// Text produced by the parser rather than copied from the source.
    Synthetic(String),
}

/// GitHub alert kind for `> [!NOTE]` style block quotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    /// Lowercase name used in CSS classes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }

    /// Human readable title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(alignment: pulldown_cmark::Alignment) -> Self {
        match alignment {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// Heading attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeHeading {
    /// Heading level (1-6).
    pub level: u8,
    /// Explicit `{#id}` attribute.
    pub id: Option<String>,
    /// Explicit `{.class}` attributes.
    pub classes: Vec<String>,
}

/// Indented code block content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeCodeBlock {
    pub lines: Vec<LineSpan>,
}

/// Fenced code block: info string plus content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeFencedCodeBlock {
    /// Full info string after the opening fence.
    pub info: String,
    pub lines: Vec<LineSpan>,
}

impl NodeFencedCodeBlock {
    /// First whitespace-separated token of the info string.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.info.split_whitespace().next()
    }
}

/// Raw diagram content, rendered verbatim by a dedicated renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDiagramBlock {
    pub lines: Vec<LineSpan>,
}

/// Link target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeLink {
    pub destination: String,
    pub title: String,
}

/// Image reference. Alt text lives in the node's inline children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeImage {
    /// Path or URL; a `data:` URI after inlining.
    pub destination: String,
    pub title: String,
}

/// Payload of a document node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue {
    Document,
    Paragraph,
    Heading(NodeHeading),
    BlockQuote(Option<AlertKind>),
    CodeBlock(NodeCodeBlock),
    FencedCodeBlock(NodeFencedCodeBlock),
    DiagramBlock(NodeDiagramBlock),
    HtmlBlock,
    /// List; `Some(start)` for ordered lists.
    List(Option<u64>),
    Item,
    FootnoteDefinition(String),
    DefinitionList,
    DefinitionListTitle,
    DefinitionListDefinition,
    Table(Vec<Alignment>),
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link(NodeLink),
    Image(NodeImage),
    Text(String),
    Code(String),
    /// One line of an HTML block.
    Html(String),
    InlineHtml(String),
    InlineMath(String),
    DisplayMath(String),
    FootnoteReference(String),
    SoftBreak,
    HardBreak,
    Rule,
    TaskListMarker(bool),
    /// Front matter block; kept in the tree but never rendered.
    MetadataBlock,
}

/// Discriminant of [`NodeValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading,
    BlockQuote,
    CodeBlock,
    FencedCodeBlock,
    DiagramBlock,
    HtmlBlock,
    List,
    Item,
    FootnoteDefinition,
    DefinitionList,
    DefinitionListTitle,
    DefinitionListDefinition,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link,
    Image,
    Text,
    Code,
    Html,
    InlineHtml,
    InlineMath,
    DisplayMath,
    FootnoteReference,
    SoftBreak,
    HardBreak,
    Rule,
    TaskListMarker,
    MetadataBlock,
}

impl NodeKind {
    /// Raw nodes carry verbatim content that must not be rendered as markdown.
    #[must_use]
    pub fn is_raw(self) -> bool {
        matches!(
            self,
            Self::CodeBlock | Self::FencedCodeBlock | Self::DiagramBlock | Self::HtmlBlock
        )
    }
}

impl NodeValue {
    /// The node's kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::Paragraph => NodeKind::Paragraph,
            Self::Heading(_) => NodeKind::Heading,
            Self::BlockQuote(_) => NodeKind::BlockQuote,
            Self::CodeBlock(_) => NodeKind::CodeBlock,
            Self::FencedCodeBlock(_) => NodeKind::FencedCodeBlock,
            Self::DiagramBlock(_) => NodeKind::DiagramBlock,
            Self::HtmlBlock => NodeKind::HtmlBlock,
            Self::List(_) => NodeKind::List,
            Self::Item => NodeKind::Item,
            Self::FootnoteDefinition(_) => NodeKind::FootnoteDefinition,
            Self::DefinitionList => NodeKind::DefinitionList,
            Self::DefinitionListTitle => NodeKind::DefinitionListTitle,
            Self::DefinitionListDefinition => NodeKind::DefinitionListDefinition,
            Self::Table(_) => NodeKind::Table,
            Self::TableHead => NodeKind::TableHead,
            Self::TableRow => NodeKind::TableRow,
            Self::TableCell => NodeKind::TableCell,
            Self::Emphasis => NodeKind::Emphasis,
            Self::Strong => NodeKind::Strong,
            Self::Strikethrough => NodeKind::Strikethrough,
            Self::Superscript => NodeKind::Superscript,
            Self::Subscript => NodeKind::Subscript,
            Self::Link(_) => NodeKind::Link,
            Self::Image(_) => NodeKind::Image,
            Self::Text(_) => NodeKind::Text,
            Self::Code(_) => NodeKind::Code,
            Self::Html(_) => NodeKind::Html,
            Self::InlineHtml(_) => NodeKind::InlineHtml,
            Self::InlineMath(_) => NodeKind::InlineMath,
            Self::DisplayMath(_) => NodeKind::DisplayMath,
            Self::FootnoteReference(_) => NodeKind::FootnoteReference,
            Self::SoftBreak => NodeKind::SoftBreak,
            Self::HardBreak => NodeKind::HardBreak,
            Self::Rule => NodeKind::Rule,
            Self::TaskListMarker(_) => NodeKind::TaskListMarker,
            Self::MetadataBlock => NodeKind::MetadataBlock,
        }
    }

    /// Raw content lines for code, fenced code and diagram blocks.
    #[must_use]
    pub fn lines(&self) -> Option<&[LineSpan]> {
        match self {
            Self::CodeBlock(block) => Some(&block.lines),
            Self::FencedCodeBlock(block) => Some(&block.lines),
            Self::DiagramBlock(block) => Some(&block.lines),
            _ => None,
        }
    }

    pub(crate) fn lines_mut(&mut self) -> Option<&mut Vec<LineSpan>> {
        match self {
            Self::CodeBlock(block) => Some(&mut block.lines),
            Self::FencedCodeBlock(block) => Some(&mut block.lines),
            Self::DiagramBlock(block) => Some(&mut block.lines),
            _ => None,
        }
    }
}

/// Convert heading level enum to number (1-6).
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_language_is_first_token() {
        let block = NodeFencedCodeBlock {
            info: "mermaid title=flow".to_owned(),
            lines: Vec::new(),
        };
        assert_eq!(block.language(), Some("mermaid"));
    }

    #[test]
    fn test_fenced_language_empty_info() {
        let block = NodeFencedCodeBlock {
            info: String::new(),
            lines: Vec::new(),
        };
        assert_eq!(block.language(), None);
    }

    #[test]
    fn test_raw_kinds() {
        assert!(NodeKind::DiagramBlock.is_raw());
        assert!(NodeKind::FencedCodeBlock.is_raw());
        assert!(NodeKind::HtmlBlock.is_raw());
        assert!(!NodeKind::Paragraph.is_raw());
        assert!(!NodeKind::Image.is_raw());
    }

    #[test]
    fn test_kind_matches_value() {
        let value = NodeValue::DiagramBlock(NodeDiagramBlock { lines: Vec::new() });
        assert_eq!(value.kind(), NodeKind::DiagramBlock);
        assert_eq!(value.lines(), Some(&[][..]));
        assert_eq!(NodeValue::Rule.lines(), None);
    }

    #[test]
    fn test_alert_kind_names() {
        assert_eq!(AlertKind::from(BlockQuoteKind::Warning), AlertKind::Warning);
        assert_eq!(AlertKind::Warning.as_str(), "warning");
        assert_eq!(AlertKind::Caution.title(), "Caution");
    }
}
