//! Markdown document tree for md2html.
//!
//! This crate turns markdown into an owned, mutable tree and provides the
//! pieces every later step is built on:
//!
//! - [`parse`]: builds a [`Document`] from `pulldown-cmark` events
//! - [`walk`]: depth-first traversal with enter/leave events
//! - [`Pipeline`] and [`Stage`]: ordered tree transforms run before rendering
//! - [`ConversionContext`]: per-conversion settings, title slot and warnings
//!
//! # Example
//!
//! ```
//! use md2html_ast::{NodeKind, ParseOptions, WalkEvent, WalkStatus, parse, walk};
//!
//! let doc = parse("# Title\n\nBody", &ParseOptions::default());
//! let mut headings = 0;
//! walk(&doc, doc.root(), |event| {
//!     if let WalkEvent::Enter(id) = event
//!         && doc.kind(id) == NodeKind::Heading
//!     {
//!         headings += 1;
//!     }
//!     Ok::<_, ()>(WalkStatus::Continue)
//! })
//! .unwrap();
//! assert_eq!(headings, 1);
//! ```

mod document;
mod node;
mod parse;
mod transform;
mod walk;

pub use document::{Document, Node, NodeId};
pub use node::{
    AlertKind, Alignment, LineSpan, NodeCodeBlock, NodeDiagramBlock, NodeFencedCodeBlock,
    NodeHeading, NodeImage, NodeKind, NodeLink, NodeValue,
};
pub use parse::{ParseOptions, parse};
pub use transform::{ConversionContext, Pipeline, Stage};
pub use walk::{WalkEvent, WalkStatus, walk};
