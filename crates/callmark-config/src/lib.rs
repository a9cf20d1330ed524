//! Configuration management for callmark.
//!
//! Parses `callmark.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [extensions]
//! tables = true
//! footnotes = true
//!
//! [html]
//! toc = true
//! smartypants = true
//!
//! [render]
//! toc_nesting_level = 3
//! strict = false
//!
//! [render.link_attributes]
//! rel = "nofollow"
//! target = "_blank"
//! external_only = true
//! ```

use std::path::{Path, PathBuf};

use callmark::{Extensions, HtmlFlags, RenderOptions};
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "callmark.toml";

/// Deepest header level Markdown has.
const MAX_HEADER_LEVEL: u8 = 6;

/// Render configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enabled Markdown extensions.
    pub extensions: Extensions,
    /// HTML output flags.
    pub html: HtmlFlags,
    /// Render behaviour.
    pub render: RenderConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[render]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Deepest relative header level in the table of contents (1-6).
    pub toc_nesting_level: u8,
    /// Abort on block renderer failures instead of skipping the block.
    pub strict: bool,
    /// Extra attributes for rendered links and images.
    pub link_attributes: Option<LinkAttributesConfig>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            toc_nesting_level: callmark::DEFAULT_TOC_NESTING_LEVEL,
            strict: false,
            link_attributes: None,
        }
    }
}

/// `[render.link_attributes]` section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkAttributesConfig {
    /// Value of the `rel` attribute, e.g. `nofollow`.
    pub rel: Option<String>,
    /// Value of the `target` attribute, e.g. `_blank`.
    pub target: Option<String>,
    /// Only add the attributes to absolute `http(s)://` and `//` URLs.
    pub external_only: bool,
}

impl LinkAttributesConfig {
    /// Attribute text inserted into tags, or `None` when nothing is set.
    #[must_use]
    pub fn attributes(&self) -> Option<String> {
        let attributes: Vec<_> = [("rel", &self.rel), ("target", &self.target)]
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}=\"{v}\"")))
            .collect();
        (!attributes.is_empty()).then(|| attributes.join(" "))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("rel", &self.rel), ("target", &self.target)] {
            if let Some(value) = value {
                require_attribute_value(value, &format!("render.link_attributes.{field}"))?;
            }
        }
        Ok(())
    }
}

/// Whether `url` points to another site.
fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
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
}

/// Require an attribute value that can be written inside double quotes.
fn require_attribute_value(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    if value.contains(['"', '<', '>', '&']) {
        return Err(ConfigError::Validation(format!(
            "{field} cannot contain '\"', '<', '>' or '&'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `callmark.toml` in the current directory and
    /// its parents, falling back to defaults when there is none.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or reading,
    /// parsing or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }
        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd));
        match discovered {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Search for the config file in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
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
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.render.toc_nesting_level;
        if level == 0 || level > MAX_HEADER_LEVEL {
            return Err(ConfigError::Validation(format!(
                "render.toc_nesting_level must be between 1 and {MAX_HEADER_LEVEL}, got {level}"
            )));
        }
        if let Some(link_attributes) = &self.render.link_attributes {
            link_attributes.validate()?;
        }
        Ok(())
    }

    /// Render options described by this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        let options = RenderOptions::new(self.extensions)
            .with_toc_nesting_level(self.render.toc_nesting_level)
            .with_strict(self.render.strict);

        let Some(link_attributes) = &self.render.link_attributes else {
            return options;
        };
        let Some(attributes) = link_attributes.attributes() else {
            return options;
        };
        let external_only = link_attributes.external_only;
        options.with_link_attributes(move |url| {
            (!external_only || is_external(url)).then(|| attributes.clone())
        })
    }

    /// HTML output flags.
    #[must_use]
    pub fn html_flags(&self) -> HtmlFlags {
        self.html
    }
}
