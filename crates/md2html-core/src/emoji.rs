//! `:shortcode:` emoji.

use md2html_ast::{ConversionContext, Document, NodeValue, Stage, WalkEvent, WalkStatus, walk};

/// Pipeline slot of the emoji stage. Runs after autolinking so URLs
/// containing colons are already links.
pub const EMOJI_PRIORITY: u32 = 400;

/// Stage replacing GitHub emoji shortcodes such as `:smile:` in text.
///
/// Unknown shortcodes stay as written. Link and image text is left alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmojiReplacer;

impl Stage for EmojiReplacer {
    fn name(&self) -> &'static str {
        "emoji"
    }

    fn priority(&self) -> u32 {
        EMOJI_PRIORITY
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
                    if let Some(replaced) = replace_shortcodes(text) {
                        targets.push((node, replaced));
                    }
                }
                _ => {}
            }
            Ok(WalkStatus::Continue)
        });

        tracing::debug!(nodes = targets.len(), "Replaced emoji shortcodes");
        for (node, text) in targets {
            *doc.value_mut(node) = NodeValue::Text(text);
        }
    }
}

/// Replace known shortcodes in `text`; `None` when nothing matched.
pub fn replace_shortcodes(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut changed = false;

    while let Some(start) = rest.find(':') {
        let after = &rest[start + 1..];
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')))
            .unwrap_or(after.len());
        if len > 0
            && after[len..].starts_with(':')
            && let Some(emoji) = emojis::get_by_shortcode(&after[..len])
        {
            out.push_str(&rest[..start]);
            out.push_str(emoji.as_str());
            rest = &after[len + 1..];
            changed = true;
            continue;
        }
        out.push_str(&rest[..=start]);
        rest = after;
    }

    out.push_str(rest);
    changed.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use md2html_ast::{ParseOptions, parse};
    use md2html_renderer::HtmlRenderer;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> String {
        let mut doc = parse(markdown, &ParseOptions::default());
        EmojiReplacer.transform(&mut doc, &mut ConversionContext::default());
        HtmlRenderer::new().render(&doc)
    }

    #[test]
    fn test_replace_shortcodes() {
        assert_eq!(
            replace_shortcodes("I :smile: Rust").as_deref(),
            Some("I \u{1f604} Rust")
        );
        assert_eq!(
            replace_shortcodes(":smile::tada:").as_deref(),
            Some("\u{1f604}\u{1f389}")
        );
        assert_eq!(replace_shortcodes("at 10:30:45"), None);
        assert_eq!(replace_shortcodes(":not_an_emoji_name:"), None);
        assert_eq!(replace_shortcodes("::"), None);
    }

    #[test]
    fn test_unknown_code_kept_next_to_known() {
        assert_eq!(
            replace_shortcodes(":nope::smile:").as_deref(),
            Some(":nope:\u{1f604}")
        );
    }

    #[test]
    fn test_emoji_in_text_not_code() {
        assert_eq!(
            render("*:smile:* `:smile:`\n"),
            "<p><em>\u{1f604}</em> <code>:smile:</code></p>\n"
        );
    }

    #[test]
    fn test_emoji_skips_links_and_blocks() {
        assert_eq!(
            render("[:smile:](x.html)\n"),
            "<p><a href=\"x.html\">:smile:</a></p>\n"
        );
        assert_eq!(
            render("```\n:smile:\n```\n"),
            "<pre><code>:smile:\n</code></pre>\n"
        );
    }
}
