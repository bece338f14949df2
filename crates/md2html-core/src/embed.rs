//! Inline local images as `data:` URIs.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use md2html_ast::{ConversionContext, Document, NodeId, NodeValue, Stage, WalkEvent, WalkStatus, walk};

/// Pipeline slot of the inliner. Runs first.
pub const EMBED_PRIORITY: u32 = 100;

/// Why a single image could not be inlined.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("detect {}: unknown media type", .0.display())]
    UnknownMediaType(PathBuf),

    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stage replacing local image destinations with `data:` URIs.
///
/// The media type comes from the file extension only. An image that cannot
/// be typed or read keeps its destination and produces a warning; the rest
/// of the document is still processed. Remote destinations are left alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageInliner;

impl Stage for ImageInliner {
    fn name(&self) -> &'static str {
        "image-inliner"
    }

    fn priority(&self) -> u32 {
        EMBED_PRIORITY
    }

    fn applies(&self, ctx: &ConversionContext) -> bool {
        ctx.embed_images()
    }

    fn transform(&self, doc: &mut Document, ctx: &mut ConversionContext) {
        for node in collect_images(doc) {
            let NodeValue::Image(image) = doc.value(node) else {
                continue;
            };
            if is_remote(&image.destination) {
                tracing::debug!(destination = %image.destination, "Skipping remote image");
                continue;
            }

            let path = ctx.base_dir().join(&image.destination);
            match data_uri(&path) {
                Ok(uri) => {
                    tracing::debug!(path = %path.display(), bytes = uri.len(), "Inlined image");
                    if let NodeValue::Image(image) = doc.value_mut(node) {
                        image.destination = uri;
                    }
                }
                Err(err) => ctx.warn(err.to_string()),
            }
        }
    }
}

/// Encode a file as `data:<media-type>;base64,<payload>`.
pub fn data_uri(path: &Path) -> Result<String, EmbedError> {
    let media_type = mime_guess::from_path(path)
        .first_raw()
        .ok_or_else(|| EmbedError::UnknownMediaType(path.to_path_buf()))?;
    let bytes = std::fs::read(path).map_err(|source| EmbedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!(
        "data:{media_type};base64,{}",
        BASE64_STANDARD.encode(bytes)
    ))
}

fn collect_images(doc: &Document) -> Vec<NodeId> {
    let mut images = Vec::new();
    let _ = walk(doc, doc.root(), |event| {
        if let WalkEvent::Enter(node) = event
            && matches!(doc.value(node), NodeValue::Image(_))
        {
            images.push(node);
        }
        Ok::<_, std::convert::Infallible>(WalkStatus::Continue)
    });
    images
}

/// URLs with a scheme (`https:`, `data:`, ...) or protocol-relative `//`.
///
/// A single letter before the colon is a Windows drive, not a scheme.
fn is_remote(destination: &str) -> bool {
    if destination.starts_with("//") {
        return true;
    }
    let Some((scheme, _)) = destination.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    scheme.len() > 1
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
