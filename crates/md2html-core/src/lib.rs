//! Markdown to HTML conversion for md2html.
//!
//! This crate wires the pieces together:
//!
//! - [`ImageInliner`]: embeds local images as `data:` URIs
//! - [`Autolinker`]: links bare URLs and email addresses
//! - [`EmojiReplacer`]: replaces `:shortcode:` emoji
//! - [`TitleExtractor`]: takes the title from the first heading
//! - [`Converter`]: parse, run stages, render
//! - [`Page`]: the standalone HTML document around the rendered body
//!
//! # Example
//!
//! ```
//! use md2html_ast::ConversionContext;
//! use md2html_core::{Converter, Page};
//!
//! let mut ctx = ConversionContext::new(".").with_diagrams(true);
//! let conversion = Converter::default().convert("# Notes\n\n```mermaid\nA-->B\n```\n", &mut ctx);
//! assert_eq!(conversion.title.as_deref(), Some("Notes"));
//! assert!(conversion.html.contains("<pre class=\"mermaid\">"));
//!
//! let page = Page::default().render(conversion.title.as_deref().unwrap_or_default(), &conversion.html);
//! assert!(page.starts_with("<!DOCTYPE html>"));
//! ```

mod autolink;
mod convert;
mod embed;
mod emoji;
mod page;
mod title;

pub use autolink::{AUTOLINK_PRIORITY, Autolinker};
pub use convert::{Conversion, Converter, normalize_newlines};
pub use embed::{EMBED_PRIORITY, EmbedError, ImageInliner, data_uri};
pub use emoji::{EMOJI_PRIORITY, EmojiReplacer, replace_shortcodes};
pub use page::Page;
pub use title::{TITLE_PRIORITY, TitleExtractor, first_heading_text};
