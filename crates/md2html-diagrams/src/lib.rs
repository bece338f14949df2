//! Mermaid diagram support for md2html.
//!
//! - [`DiagramReclassifier`]: pipeline stage turning ```` ```mermaid ````
//!   fenced blocks into diagram blocks
//! - [`DiagramBlockRenderer`]: renders diagram blocks as
//!   `<pre class="mermaid">` containers for the mermaid client script
//!
//! Both halves are needed: without the renderer a diagram block falls back
//! to a plain code block.

mod consts;
mod reclassify;
mod render;

pub use consts::{CONTAINER_CLASS, MERMAID_LANGUAGE};
pub use reclassify::DiagramReclassifier;
pub use render::DiagramBlockRenderer;
