//! Standalone HTML page around a converted body.

use std::fmt::Write;

use md2html_renderer::escape_html;

const HIGHLIGHT_JS: &str = "https://cdn.jsdelivr.net/gh/highlightjs/cdn-release@10/build";
const MATHJAX_POLYFILL: &str = "https://polyfill.io/v3/polyfill.min.js?features=es6";
const MATHJAX: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js";
const MERMAID: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

/// Page shell settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// `<html lang>` attribute.
    pub lang: String,
    /// Load highlight.js.
    pub highlight: bool,
    /// highlight.js style name. Empty disables highlight.js.
    pub highlight_style: String,
    /// Extra highlight.js languages to load.
    pub highlight_languages: Vec<String>,
    /// Load MathJax.
    pub math: bool,
    /// Load mermaid.
    pub mermaid: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            lang: "en".to_owned(),
            highlight: true,
            highlight_style: "github".to_owned(),
            highlight_languages: Vec::new(),
            math: false,
            mermaid: false,
        }
    }
}

impl Page {
    /// Wrap `body` into a complete HTML document.
    pub fn render(&self, title: &str, body: &str) -> String {
        let mut out = String::with_capacity(body.len() + 1024);
        out.push_str("<!DOCTYPE html>\n");
        let _ = writeln!(out, r#"<html lang="{}">"#, escape_html(&self.lang));
        out.push_str("<head>\n");
        out.push_str("<meta charset=\"UTF-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", escape_html(title));

        if self.highlight && !self.highlight_style.is_empty() {
            let _ = writeln!(
                out,
                r#"<link rel="stylesheet" href="{HIGHLIGHT_JS}/styles/{}.min.css">"#,
                self.highlight_style
            );
            let _ = writeln!(out, r#"<script src="{HIGHLIGHT_JS}/highlight.min.js"></script>"#);
            for lang in &self.highlight_languages {
                let _ = writeln!(
                    out,
                    r#"<script src="{HIGHLIGHT_JS}/languages/{lang}.min.js"></script>"#
                );
            }
            out.push_str("<script>hljs.initHighlightingOnLoad();</script>\n");
        }

        if self.math {
            let _ = writeln!(out, r#"<script src="{MATHJAX_POLYFILL}"></script>"#);
            let _ = writeln!(
                out,
                r#"<script id="MathJax-script" async src="{MATHJAX}"></script>"#
            );
        }

        if self.mermaid {
            let _ = writeln!(out, r#"<script src="{MERMAID}"></script>"#);
            out.push_str("<script>mermaid.initialize({ startOnLoad: true });</script>\n");
        }

        out.push_str("</head>\n<body>\n");
        out.push_str(body);
        if !body.is_empty() && !body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}
