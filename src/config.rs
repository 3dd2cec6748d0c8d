//! Configuration file parser for ~/.config/crfnews/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde and logged as warnings, so typos show up
//! in the log without breaking startup.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::feed::{
    FilterBar, ItemMapper, DEFAULT_CATEGORY_PRESETS, DEFAULT_EXCERPT_MAX_CHARS,
    DEFAULT_FALLBACK_CATEGORY, DEFAULT_PLACEHOLDER_IMAGE,
};
use crate::util::{validate_url, UrlValidationError};

/// Public endpoint of the council's content API.
pub const DEFAULT_API_BASE_URL: &str = "https://wordpress.crf-al.org.br/wp-json/wp/v2/";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid api_base_url: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base of the REST API, ending in `/wp-json/wp/v2/`.
    pub api_base_url: String,

    /// Posts requested per page.
    pub per_page: u32,

    /// Excerpt budget in characters, before the ellipsis marker.
    pub excerpt_max_chars: usize,

    /// Image reference used when a post has no featured media.
    pub placeholder_image: String,

    /// Category label used when a post has no taxonomy term.
    pub fallback_category: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Rows from the end of the list at which the next page is requested.
    pub load_more_threshold: usize,

    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Category tabs shown before any post has loaded.
    pub categories: Vec<String>,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            per_page: 12,
            excerpt_max_chars: DEFAULT_EXCERPT_MAX_CHARS,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
            request_timeout_secs: 30,
            load_more_threshold: 3,
            theme: "dark".to_string(),
            categories: DEFAULT_CATEGORY_PRESETS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// The server caps `per_page` at 100.
    pub const MAX_PER_PAGE: u32 = 100;

    const KNOWN_KEYS: [&'static str; 10] = [
        "api_base_url",
        "per_page",
        "excerpt_max_chars",
        "placeholder_image",
        "fallback_category",
        "request_timeout_secs",
        "load_more_threshold",
        "theme",
        "categories",
        "keybindings",
    ];

    /// Default config location (`$HOME/.config/crfnews/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("crfnews")
                .join("config.toml"),
        )
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check size before reading so a huge file is never pulled into memory
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            api_base_url = %config.api_base_url,
            theme = %config.theme,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.check_values()?;
        Ok(config)
    }

    fn check_values(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 || self.per_page > Self::MAX_PER_PAGE {
            return Err(ConfigError::InvalidValue {
                key: "per_page",
                reason: format!("must be between 1 and {}", Self::MAX_PER_PAGE),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The API base URL, validated and ending in `/`.
    pub fn api_base(&self) -> Result<Url, ConfigError> {
        Ok(validate_url(&self.api_base_url)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn item_mapper(&self) -> ItemMapper {
        ItemMapper::new(
            self.excerpt_max_chars,
            self.placeholder_image.clone(),
            self.fallback_category.clone(),
        )
    }

    pub fn filter_bar(&self) -> FilterBar {
        FilterBar::new(self.categories.iter().cloned())
    }
}

// ============================================================================
// Tests
// ============================================================================
