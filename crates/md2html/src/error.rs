//! CLI error types.

use std::path::PathBuf;

use md2html_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: input is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
