//! Internal constants for diagram handling.

/// Fenced block language that marks a diagram.
pub const MERMAID_LANGUAGE: &str = "mermaid";

/// Class on the diagram container; the mermaid client script looks for it.
pub const CONTAINER_CLASS: &str = "mermaid";

/// Pipeline slot of the reclassifier. Runs after image inlining and before
/// title extraction.
pub const RECLASSIFY_PRIORITY: u32 = 200;
