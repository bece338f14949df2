//! Turn bare URLs and email addresses in text into links.

use linkify::{LinkFinder, LinkKind};
use md2html_ast::{
    ConversionContext, Document, NodeId, NodeLink, NodeValue, Stage, WalkEvent, WalkStatus, walk,
};

/// Pipeline slot of the autolinker.
pub const AUTOLINK_PRIORITY: u32 = 300;

/// Stage rewriting `https://...`, `www....` and `user@host` text into links.
///
/// Text already inside a link or an image is left alone, as are code spans
/// and raw blocks, which never hold text nodes.
pub struct Autolinker {
    finder: LinkFinder,
}

/// A link found inside a text node.
#[derive(Debug, PartialEq, Eq)]
struct Found {
    start: usize,
    end: usize,
    href: String,
}

impl Autolinker {
    #[must_use]
    pub fn new() -> Self {
        let mut finder = LinkFinder::new();
        finder.url_must_have_scheme(false);
        Self { finder }
    }

    fn find(&self, text: &str) -> Vec<Found> {
        self.finder
            .links(text)
            .filter_map(|link| {
                let href = href(link.as_str(), link.kind())?;
                Some(Found {
                    start: link.start(),
                    end: link.end(),
                    href,
                })
            })
            .collect()
    }
}

impl Default for Autolinker {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Autolinker {
    fn name(&self) -> &'static str {
        "autolinker"
    }

    fn priority(&self) -> u32 {
        AUTOLINK_PRIORITY
    }

    fn transform(&self, doc: &mut Document, _ctx: &mut ConversionContext) {
        let mut targets = Vec::new();
        let _ = walk(doc, doc.root(), |event| {
            let WalkEvent::Enter(node) = event else {
                return Ok::<_, std::convert::Infallible>(WalkStatus::Continue);
            };
            match doc.value(node) {
                NodeValue::Link(_) | NodeValue::Image(_) => return Ok(WalkStatus::SkipChildren),
                NodeValue::Text(text) => {
                    let found = self.find(text);
                    if !found.is_empty() {
                        targets.push((node, text.clone(), found));
                    }
                }
                _ => {}
            }
            Ok(WalkStatus::Continue)
        });

        for (node, text, found) in targets {
            tracing::debug!(links = found.len(), "Autolinking text");
            split_text(doc, node, &text, found);
        }
    }
}

/// Link target for a match; bare domains without `www.` are not linked.
fn href(text: &str, kind: &LinkKind) -> Option<String> {
    match kind {
        LinkKind::Email => Some(format!("mailto:{text}")),
        LinkKind::Url if text.contains("://") => Some(text.to_owned()),
        LinkKind::Url if text.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("www.")) => {
            Some(format!("http://{text}"))
        }
        _ => None,
    }
}

/// Replace `node` by alternating text and link nodes.
fn split_text(doc: &mut Document, node: NodeId, text: &str, found: Vec<Found>) {
    let range = doc.node(node).source_range();
    let mut last = 0;
    for link in found {
        if link.start > last {
            let before = NodeValue::Text(text[last..link.start].to_owned());
            doc.insert_before(node, before, range.clone());
        }
        let value = NodeValue::Link(NodeLink {
            destination: link.href,
            title: String::new(),
        });
        if let Some(id) = doc.insert_before(node, value, range.clone()) {
            doc.append_child(id, NodeValue::Text(text[link.start..link.end].to_owned()), range.clone());
        }
        last = link.end;
    }

    if last < text.len() {
        *doc.value_mut(node) = NodeValue::Text(text[last..].to_owned());
    } else {
        doc.detach(node);
    }
}
