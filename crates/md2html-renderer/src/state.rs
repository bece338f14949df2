//! Per-render bookkeeping.

use std::collections::HashMap;

use crate::util::slugify;

/// Base id for headings whose text yields an empty slug.
const FALLBACK_ID: &str = "heading";

/// Hands out unique heading ids for one render.
#[derive(Debug, Default)]
pub(crate) struct HeadingIds {
    counts: HashMap<String, usize>,
}

impl HeadingIds {
    /// Id for a heading with an explicit `{#id}` or with the given text.
    ///
    /// Repeated ids get `-1`, `-2`, ... suffixes in document order. Text
    /// without any ASCII letter or digit falls back to `heading`.
    pub(crate) fn next(&mut self, explicit: Option<&str>, text: &str) -> String {
        let base_id = match explicit {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => match slugify(text) {
                slug if slug.is_empty() => FALLBACK_ID.to_owned(),
                slug => slug,
            },
        };
        let count = self.counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Footnote numbers, assigned in order of first appearance.
#[derive(Debug, Default)]
pub(crate) struct Footnotes {
    numbers: HashMap<String, usize>,
}

impl Footnotes {
    pub(crate) fn number(&mut self, name: &str) -> usize {
        let next = self.numbers.len() + 1;
        *self.numbers.entry(name.to_owned()).or_insert(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_ids_deduplicate() {
        let mut ids = HeadingIds::default();
        assert_eq!(ids.next(None, "Intro"), "intro");
        assert_eq!(ids.next(None, "Intro"), "intro-1");
        assert_eq!(ids.next(None, "intro"), "intro-2");
        assert_eq!(ids.next(Some("custom"), "Intro"), "custom");
        assert_eq!(ids.next(Some("custom"), "Other"), "custom-1");
    }

    #[test]
    fn test_heading_ids_without_ascii_text() {
        let mut ids = HeadingIds::default();
        assert_eq!(ids.next(None, "日本語"), "heading");
        assert_eq!(ids.next(None, "概要"), "heading-1");
        assert_eq!(ids.next(None, "!!"), "heading-2");
        assert_eq!(ids.next(None, "Heading"), "heading-3");
    }

    #[test]
    fn test_footnote_numbers_are_stable() {
        let mut notes = Footnotes::default();
        assert_eq!(notes.number("b"), 1);
        assert_eq!(notes.number("a"), 2);
        assert_eq!(notes.number("b"), 1);
    }
}
