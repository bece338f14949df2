//! HTML renderer for the md2html document tree.
//!
//! [`HtmlRenderer`] walks a [`Document`](md2html_ast::Document) and produces
//! an HTML fragment. Rendering of individual node kinds can be replaced by
//! registering a [`NodeRenderer`]; this is how diagram blocks get their own
//! container markup.
//!
//! # Example
//!
//! ```
//! use md2html_ast::{ParseOptions, parse};
//! use md2html_renderer::HtmlRenderer;
//!
//! let doc = parse("# Hello\n\n**Bold** text", &ParseOptions::default());
//! let html = HtmlRenderer::new().render(&doc);
//! assert_eq!(
//!     html,
//!     "<h1 id=\"hello\">Hello</h1>\n<p><strong>Bold</strong> text</p>\n"
//! );
//! ```

mod html;
mod state;
mod util;

pub use html::{HtmlRenderer, NodeRenderer};
pub use util::{escape_html, push_escaped, slugify};
