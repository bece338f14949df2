//! Configuration management for md2html.
//!
//! Parses `md2html.toml` configuration files with serde and provides
//! auto-discovery of the config file in the current directory and its
//! parents.
//!
//! CLI settings are applied after loading via [`CliSettings`], so command
//! line flags always win over the file.
//!
//! ## Path expansion
//!
//! `images.base_dir` supports `${VAR}`, `${VAR:-default}` and a leading `~`.
//! A relative value is resolved against the directory of the config file.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override document title.
    pub title: Option<String>,
    /// Override `<html lang>`.
    pub lang: Option<String>,
    /// Override GitHub Flavored Markdown support.
    pub gfm: Option<bool>,
    /// Override math support.
    pub math: Option<bool>,
    /// Override emoji shortcode support.
    pub emoji: Option<bool>,
    /// Override highlight.js usage.
    pub highlight: Option<bool>,
    /// Override highlight.js style.
    pub highlight_style: Option<String>,
    /// Override extra highlight.js languages.
    pub highlight_languages: Option<Vec<String>>,
    /// Override image embedding.
    pub embed_images: Option<bool>,
    /// Override image base directory.
    pub base_dir: Option<PathBuf>,
    /// Override mermaid diagram support.
    pub mermaid: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "md2html.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page shell configuration.
    pub page: PageConfig,
    /// Markdown dialect configuration.
    pub markdown: MarkdownConfig,
    /// highlight.js configuration.
    pub highlight: HighlightConfig,
    /// Image configuration (paths are raw strings from TOML).
    images: ImagesConfigRaw,
    /// Diagram configuration.
    pub diagrams: DiagramsConfig,

    /// Resolved image configuration (set after loading).
    #[serde(skip)]
    pub images_resolved: ImagesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Page shell configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// `<html lang>` attribute.
    pub lang: String,
    /// Document title. Empty means "take it from the first heading".
    pub title: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_owned(),
            title: None,
        }
    }
}

/// Markdown dialect configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Tables, strikethrough, task lists, alerts and bare URL autolinks.
    pub gfm: bool,
    /// `$math$`; also loads MathJax.
    pub math: bool,
    /// `:shortcode:` emoji.
    pub emoji: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            math: false,
            emoji: true,
        }
    }
}

/// highlight.js configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Whether highlight.js is loaded.
    pub enabled: bool,
    /// Style name. Empty disables highlight.js.
    pub style: String,
    /// Extra languages to load.
    pub languages: Vec<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            style: "github".to_owned(),
            languages: Vec::new(),
        }
    }
}

/// Raw image configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImagesConfigRaw {
    embed: Option<bool>,
    base_dir: Option<String>,
}

/// Resolved image configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ImagesConfig {
    /// Whether local images are inlined as `data:` URIs.
    pub embed: bool,
    /// Directory image paths are resolved against. `None` means the input
    /// file's directory.
    pub base_dir: Option<PathBuf>,
}

/// Diagram configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Render ```` ```mermaid ```` blocks as diagrams.
    pub mermaid: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`images.base_dir`").
        field: String,
        /// Error message (e.g., "${`ASSETS`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a value that is safe to put into a CDN URL path.
fn require_path_segment(value: &str, field: &str) -> Result<(), ConfigError> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if !valid || value.contains("..") {
        return Err(ConfigError::Validation(format!(
            "{field} must contain only letters, digits, '_', '.' and '-', got {value:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `md2html.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Document title, if one was configured. An empty title counts as none.
    pub fn title(&self) -> Option<&str> {
        self.page.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(title) = &settings.title {
            self.page.title = Some(title.clone());
        }
        if let Some(lang) = &settings.lang {
            self.page.lang.clone_from(lang);
        }
        if let Some(gfm) = settings.gfm {
            self.markdown.gfm = gfm;
        }
        if let Some(math) = settings.math {
            self.markdown.math = math;
        }
        if let Some(emoji) = settings.emoji {
            self.markdown.emoji = emoji;
        }
        if let Some(highlight) = settings.highlight {
            self.highlight.enabled = highlight;
        }
        if let Some(style) = &settings.highlight_style {
            self.highlight.style.clone_from(style);
        }
        if let Some(languages) = &settings.highlight_languages {
            self.highlight.languages.clone_from(languages);
        }
        if let Some(embed) = settings.embed_images {
            self.images_resolved.embed = embed;
        }
        if let Some(base_dir) = &settings.base_dir {
            self.images_resolved.base_dir = Some(base_dir.clone());
        }
        if let Some(mermaid) = settings.mermaid {
            self.diagrams.mermaid = mermaid;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.page.lang, "page.lang")?;
        self.validate_highlight()?;
        Ok(())
    }

    /// Style and language names end up in CDN URLs.
    fn validate_highlight(&self) -> Result<(), ConfigError> {
        if !self.highlight.style.is_empty() {
            require_path_segment(&self.highlight.style, "highlight.style")?;
        }
        for language in &self.highlight.languages {
            require_non_empty(language, "highlight.languages")?;
            require_path_segment(language, "highlight.languages")?;
        }
        Ok(())
    }

    /// Expand and resolve `images.base_dir` against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let base_dir = match self.images.base_dir.as_deref() {
            Some(raw) if !raw.is_empty() => {
                Some(config_dir.join(expand::expand_path(raw, "images.base_dir")?))
            }
            _ => None,
        };
        self.images_resolved = ImagesConfig {
            embed: self.images.embed.unwrap_or(false),
            base_dir,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page.lang, "en");
        assert_eq!(config.title(), None);
        assert!(config.markdown.gfm);
        assert!(!config.markdown.math);
        assert!(config.markdown.emoji);
        assert!(config.highlight.enabled);
        assert_eq!(config.highlight.style, "github");
        assert!(config.highlight.languages.is_empty());
        assert!(!config.images_resolved.embed);
        assert_eq!(config.images_resolved.base_dir, None);
        assert!(!config.diagrams.mermaid);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.page.lang, "en");
        assert_eq!(config.highlight.style, "github");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[page]
lang = "ja"
title = "Notes"

[markdown]
gfm = false
math = true
emoji = false

[highlight]
enabled = false
style = "monokai"
languages = ["rust", "toml"]

[images]
embed = true
base_dir = "assets"

[diagrams]
mermaid = true
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(config.page.lang, "ja");
        assert_eq!(config.title(), Some("Notes"));
        assert!(!config.markdown.gfm);
        assert!(config.markdown.math);
        assert!(!config.markdown.emoji);
        assert!(!config.highlight.enabled);
        assert_eq!(config.highlight.style, "monokai");
        assert_eq!(config.highlight.languages, vec!["rust", "toml"]);
        assert!(config.images_resolved.embed);
        assert_eq!(
            config.images_resolved.base_dir,
            Some(PathBuf::from("/project/assets"))
        );
        assert!(config.diagrams.mermaid);
    }

    #[test]
    fn test_absolute_base_dir_kept() {
        let toml = r#"
[images]
base_dir = "/srv/img"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();
        assert_eq!(
            config.images_resolved.base_dir,
            Some(PathBuf::from("/srv/img"))
        );
    }

    #[test]
    fn test_empty_title_is_none() {
        let toml = r#"
[page]
title = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.title(), None);
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let toml = r#"
[markdown]
gfm = "yes"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_lang() {
        let mut config = Config::default();
        config.page.lang = String::new();
        assert_validation_error(&config, &["page.lang", "cannot be empty"]);
    }

    #[test]
    fn test_validate_highlight_style() {
        let mut config = Config::default();
        config.highlight.style = "../evil".to_owned();
        assert_validation_error(&config, &["highlight.style"]);

        config.highlight.style = "atom-one-dark".to_owned();
        config.validate().unwrap();

        config.highlight.style = String::new();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_highlight_languages() {
        let mut config = Config::default();
        config.highlight.languages = vec!["rust".to_owned(), "c++".to_owned()];
        assert_validation_error(&config, &["highlight.languages", "c++"]);

        config.highlight.languages = vec![String::new()];
        assert_validation_error(&config, &["highlight.languages", "cannot be empty"]);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            title: Some("From CLI".to_owned()),
            math: Some(true),
            emoji: Some(false),
            highlight_languages: Some(vec!["go".to_owned()]),
            embed_images: Some(true),
            base_dir: Some(PathBuf::from("/img")),
            mermaid: Some(true),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.title(), Some("From CLI"));
        assert!(config.markdown.math);
        assert!(!config.markdown.emoji);
        assert_eq!(config.highlight.languages, vec!["go"]);
        assert!(config.images_resolved.embed);
        assert_eq!(config.images_resolved.base_dir, Some(PathBuf::from("/img")));
        assert!(config.diagrams.mermaid);
        assert_eq!(config.page.lang, "en"); // Unchanged
        assert!(config.highlight.enabled); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty_is_noop() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.page.lang, "en");
        assert_eq!(config.highlight.style, "github");
        assert!(!config.images_resolved.embed);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[images]\nembed = true\nbase_dir = \"img\"\n\n[page]\nlang = \"de\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.page.lang, "de");
        assert!(config.images_resolved.embed);
        assert_eq!(config.images_resolved.base_dir, Some(dir.path().join("img")));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("md2html.toml");
        std::fs::write(&path, "[highlight]\nstyle = \"a/b\"\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_cli_settings_validated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("md2html.toml");
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            lang: Some(String::new()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();
        assert!(err.to_string().contains("page.lang"));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            Config::discover_config(&nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_discover_config_ignores_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(CONFIG_FILENAME)).unwrap();
        let found = Config::discover_config(dir.path());
        assert_ne!(found, Some(dir.path().join(CONFIG_FILENAME)));
    }
}
