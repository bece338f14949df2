//! md2html - convert markdown to a standalone HTML page.
//!
//! Reads markdown from a file or stdin and writes a complete HTML document
//! to a file or stdout. Optional features: embedding local images, mermaid
//! diagrams, MathJax and highlight.js.

mod convert;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use convert::ConvertArgs;
use output::Output;

/// md2html - markdown to HTML converter.
#[derive(Parser)]
#[command(name = "md2html", version, about)]
struct Cli {
    #[command(flatten)]
    args: ConvertArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.args.verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.args.execute(&output) {
        output.error(&format!("md2html: {err}"));
        std::process::exit(1);
    }
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("info");
    }
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(false, None).to_string(), "warn");
        assert_eq!(log_filter(false, Some("")).to_string(), "warn");
        assert_eq!(log_filter(false, Some("debug")).to_string(), "debug");
        assert_eq!(log_filter(true, Some("debug")).to_string(), "info");
    }
}
