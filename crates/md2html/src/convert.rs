//! The conversion command.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use md2html_ast::{ConversionContext, ParseOptions};
use md2html_config::{CliSettings, Config};
use md2html_core::{Converter, Page};

use crate::error::CliError;
use crate::output::Output;

/// Name used for the standard streams in messages.
const STDIN: &str = "<stdin>";
const STDOUT: &str = "<stdout>";

/// Arguments for a conversion.
#[derive(Args, Debug)]
pub(crate) struct ConvertArgs {
    /// Markdown input file (default: stdin; `-` also means stdin).
    input: Option<PathBuf>,

    /// HTML output file (default: stdout; `-` also means stdout).
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover md2html.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document title (default: text of the first heading).
    #[arg(long)]
    title: Option<String>,

    /// HTML lang attribute (default: en).
    #[arg(long)]
    lang: Option<String>,

    /// Use highlight.js (default: enabled).
    #[arg(long)]
    hl: Option<bool>,

    /// Do not use highlight.js.
    #[arg(long, conflicts_with = "hl")]
    no_hl: bool,

    /// highlight.js style (default: github).
    #[arg(long, value_name = "STYLE")]
    hl_style: Option<String>,

    /// Comma separated list of extra highlight.js languages.
    #[arg(long, value_name = "LANGS", value_delimiter = ',')]
    hl_lang: Option<Vec<String>>,

    /// Enable math and load MathJax.
    #[arg(short, long)]
    math: bool,

    /// Embed local images as data URIs (default: disabled).
    #[arg(long)]
    embed: Option<bool>,

    /// Do not embed images.
    #[arg(long, conflicts_with = "embed")]
    no_embed: bool,

    /// Render mermaid code blocks as diagrams (default: disabled).
    #[arg(long)]
    mermaid: Option<bool>,

    /// Render mermaid code blocks as plain code.
    #[arg(long, conflicts_with = "mermaid")]
    no_mermaid: bool,

    /// Directory local image paths are resolved against
    /// (default: the input file's directory).
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Converted page ready to be written.
#[derive(Debug)]
pub(crate) struct Rendered {
    pub html: String,
    pub warnings: Vec<String>,
}

impl ConvertArgs {
    /// Convert the input and write the page.
    ///
    /// Nothing is written unless the whole conversion succeeded.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let rendered = self.render()?;
        for warning in &rendered.warnings {
            output.warning(warning);
        }
        write_output(stream_path(self.output.as_deref()), &rendered.html)
    }

    /// Load configuration, read the input and produce the page.
    pub(crate) fn render(&self) -> Result<Rendered, CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let input = stream_path(self.input.as_deref());
        let markdown = read_input(input)?;

        let base_dir = resolve_base_dir(config.images_resolved.base_dir.as_deref(), input)?;
        tracing::info!(
            input = %input.unwrap_or(Path::new(STDIN)).display(),
            base_dir = %base_dir.display(),
            "Converting"
        );

        let mut ctx = ConversionContext::new(base_dir)
            .with_embed_images(config.images_resolved.embed)
            .with_diagrams(config.diagrams.mermaid);
        if let Some(title) = config.title() {
            ctx = ctx.with_title(title);
        }

        let options = ParseOptions {
            gfm: config.markdown.gfm,
            math: config.markdown.math,
            emoji: config.markdown.emoji,
            ..ParseOptions::default()
        };
        let conversion = Converter::new(options).convert(&markdown, &mut ctx);

        let page = Page {
            lang: config.page.lang.clone(),
            highlight: config.highlight.enabled,
            highlight_style: config.highlight.style.clone(),
            highlight_languages: config.highlight.languages.clone(),
            math: config.markdown.math,
            mermaid: config.diagrams.mermaid,
        };
        let html = page.render(
            conversion.title.as_deref().unwrap_or_default(),
            &conversion.html,
        );

        Ok(Rendered {
            html,
            warnings: conversion.warnings,
        })
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            title: self.title.clone().filter(|t| !t.is_empty()),
            lang: self.lang.clone(),
            gfm: None,
            math: self.math.then_some(true),
            emoji: None,
            highlight: self.resolve_highlight(),
            highlight_style: self.hl_style.clone(),
            highlight_languages: self.hl_lang.as_ref().map(|langs| {
                langs
                    .iter()
                    .map(|l| l.trim().to_owned())
                    .filter(|l| !l.is_empty())
                    .collect()
            }),
            embed_images: self.resolve_embed(),
            base_dir: self.base_dir.clone(),
            mermaid: self.resolve_mermaid(),
        }
    }

    /// Resolve highlight.js usage from --hl/--no-hl flags.
    fn resolve_highlight(&self) -> Option<bool> {
        self.no_hl.then_some(false).or(self.hl)
    }

    /// Resolve image embedding from --embed/--no-embed flags.
    fn resolve_embed(&self) -> Option<bool> {
        self.no_embed.then_some(false).or(self.embed)
    }

    /// Resolve mermaid support from --mermaid/--no-mermaid flags.
    fn resolve_mermaid(&self) -> Option<bool> {
        self.no_mermaid.then_some(false).or(self.mermaid)
    }
}

/// `None` and `-` select the standard stream.
fn stream_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| *p != Path::new("-"))
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    let (bytes, name) = match path {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|source| CliError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            (bytes, path.to_path_buf())
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut bytes)
                .map_err(|source| CliError::Read {
                    path: PathBuf::from(STDIN),
                    source,
                })?;
            (bytes, PathBuf::from(STDIN))
        }
    };
    String::from_utf8(bytes).map_err(|_| CliError::Encoding { path: name })
}

fn write_output(path: Option<&Path>, html: &str) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, html).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(html.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| CliError::Write {
                    path: PathBuf::from(STDOUT),
                    source,
                })
        }
    }
}

/// Configured directory, else the input file's directory, else the current
/// directory.
fn resolve_base_dir(configured: Option<&Path>, input: Option<&Path>) -> Result<PathBuf, CliError> {
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }
    if let Some(parent) = input
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    {
        return Ok(parent.to_path_buf());
    }
    Ok(std::env::current_dir()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ConvertArgs,
    }

    fn parse(args: &[&str]) -> ConvertArgs {
        TestCli::try_parse_from(std::iter::once("md2html").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    /// Project directory with an empty config file so discovery never
    /// leaves the temp dir.
    fn project() -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("md2html.toml");
        std::fs::write(&config, "").unwrap();
        let config = config.display().to_string();
        (dir, config)
    }

    #[test]
    fn test_positional_streams() {
        let args = parse(&["in.md", "out.html"]);
        assert_eq!(args.input, Some(PathBuf::from("in.md")));
        assert_eq!(args.output, Some(PathBuf::from("out.html")));

        let args = parse(&["-"]);
        assert_eq!(stream_path(args.input.as_deref()), None);
        assert_eq!(args.output, None);
    }

    #[test]
    fn test_flag_pairs() {
        assert_eq!(parse(&["--no-hl"]).resolve_highlight(), Some(false));
        assert_eq!(parse(&["--hl", "true"]).resolve_highlight(), Some(true));
        assert_eq!(parse(&[]).resolve_highlight(), None);
        assert_eq!(parse(&["--embed", "true"]).resolve_embed(), Some(true));
        assert_eq!(parse(&["--no-mermaid"]).resolve_mermaid(), Some(false));
        assert!(TestCli::try_parse_from(["md2html", "--hl", "true", "--no-hl"]).is_err());
    }

    #[test]
    fn test_cli_settings() {
        let settings = parse(&["--title", "", "--hl-lang", "rust, go,", "-m"]).cli_settings();
        assert_eq!(settings.title, None);
        assert_eq!(
            settings.highlight_languages,
            Some(vec!["rust".to_owned(), "go".to_owned()])
        );
        assert_eq!(settings.math, Some(true));
        assert_eq!(parse(&[]).cli_settings().math, None);
    }

    #[test]
    fn test_resolve_base_dir() {
        assert_eq!(
            resolve_base_dir(Some(Path::new("/img")), Some(Path::new("/docs/a.md"))).unwrap(),
            PathBuf::from("/img")
        );
        assert_eq!(
            resolve_base_dir(None, Some(Path::new("/docs/a.md"))).unwrap(),
            PathBuf::from("/docs")
        );
        assert_eq!(
            resolve_base_dir(None, Some(Path::new("a.md"))).unwrap(),
            std::env::current_dir().unwrap()
        );
        assert_eq!(
            resolve_base_dir(None, None).unwrap(),
            std::env::current_dir().unwrap()
        );
    }

    #[test]
    fn test_render_page() {
        let (dir, config) = project();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "# Hello *World*\r\n\r\n![dot](dot.gif)\r\n").unwrap();
        std::fs::write(dir.path().join("dot.gif"), b"GIF").unwrap();

        let input = input.display().to_string();
        let rendered = parse(&["-c", &config, "--embed", "true", "--no-hl", &input])
            .render()
            .unwrap();

        assert!(rendered.warnings.is_empty());
        assert!(rendered.html.contains("<title>Hello World</title>"));
        assert!(rendered.html.contains(r#"<img src="data:image/gif;base64,R0lG" alt="dot">"#));
        assert!(!rendered.html.contains("hljs"));
    }

    #[test]
    fn test_render_reports_broken_image() {
        let (dir, config) = project();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "![x](missing.png)\n").unwrap();

        let input = input.display().to_string();
        let rendered = parse(&["-c", &config, "--embed", "true", "--title", "T", &input])
            .render()
            .unwrap();

        assert_eq!(rendered.warnings.len(), 1);
        assert!(rendered.html.contains("<title>T</title>"));
        assert!(rendered.html.contains(r#"<img src="missing.png" alt="x">"#));
    }

    #[test]
    fn test_render_mermaid_page() {
        let (dir, config) = project();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "```mermaid\nA-->B\n```\n").unwrap();

        let input = input.display().to_string();
        let rendered = parse(&["-c", &config, "--mermaid", "true", &input])
            .render()
            .unwrap();

        assert!(rendered.html.contains("<pre class=\"mermaid\">A--&gt;B\n</pre>"));
        assert!(rendered.html.contains("mermaid.initialize"));
        assert!(rendered.html.contains("<title></title>"));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let (dir, config) = project();
        let input = dir.path().join("missing.md").display().to_string();
        let err = parse(&["-c", &config, &input]).render().unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
        assert!(err.to_string().starts_with("read "));
    }

    #[test]
    fn test_non_utf8_input_is_fatal() {
        let (dir, config) = project();
        let input = dir.path().join("latin1.md");
        std::fs::write(&input, b"caf\xe9\n").unwrap();
        let input = input.display().to_string();
        let err = parse(&["-c", &config, &input]).render().unwrap_err();
        assert!(matches!(err, CliError::Encoding { .. }));
    }

    #[test]
    fn test_execute_writes_output_file() {
        let (dir, config) = project();
        let input = dir.path().join("doc.md");
        let output_path = dir.path().join("doc.html");
        std::fs::write(&input, "text\n").unwrap();

        let input = input.display().to_string();
        let out = output_path.display().to_string();
        parse(&["-c", &config, &input, &out])
            .execute(&Output::new())
            .unwrap();

        let html = std::fs::read_to_string(&output_path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.ends_with("<body>\n<p>text</p>\n</body>\n</html>\n"));
    }

    #[test]
    fn test_failed_conversion_writes_nothing() {
        let (dir, config) = project();
        let output_path = dir.path().join("doc.html");
        let input = dir.path().join("missing.md").display().to_string();
        let out = output_path.display().to_string();

        assert!(parse(&["-c", &config, &input, &out])
            .execute(&Output::new())
            .is_err());
        assert!(!output_path.exists());
    }
}
