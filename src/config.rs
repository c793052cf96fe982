//! Application configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user config file overrides any subset of them.
//!
//! ## Config File Location
//!
//! ```text
//! ~/.config/snaplink/config.toml     # Linux (XDG config dir)
//! ~/Library/Application Support/snaplink/config.toml   # macOS
//! ```
//!
//! `--config <FILE>` points at any other file. A missing file is not an
//! error: the stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! max_width = 800           # Width bound in pixels (never upscales)
//! quality = 0.6             # JPEG quality, 0 < q <= 1
//!
//! [caption]
//! enabled = true
//! api_key_env = "API_KEY"   # Environment variable holding the Gemini key
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! model = "gemini-3-flash-preview"
//! timeout_secs = 8
//! max_output_tokens = 100
//! temperature = 0.7
//!
//! [link]
//! base_url = "https://snaphost.app"
//! accept_unknown_versions = false
//! max_url_length = 32768    # Warn (never fail) above this
//!
//! [history]
//! capacity = 10
//! # path = "/custom/history.json"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CompressConfig, Quality};
use crate::link::VersionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Directory name under the platform config/data dirs.
pub const APP_DIR: &str = "snaplink";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Resize and re-encode settings.
    pub compression: CompressionConfig,
    /// Remote caption generation.
    pub caption: CaptionConfig,
    /// Share URL construction and decoding.
    pub link: LinkConfig,
    /// Local share history.
    pub history: HistoryConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compression.max_width == 0 {
            return Err(ConfigError::Validation(
                "compression.max_width must be greater than 0".into(),
            ));
        }
        let q = self.compression.quality;
        if q.is_nan() || q <= 0.0 || q > 1.0 {
            return Err(ConfigError::Validation(
                "compression.quality must be in (0, 1]".into(),
            ));
        }
        if self.caption.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "caption.timeout_secs must be greater than 0".into(),
            ));
        }
        let t = self.caption.temperature;
        if t.is_nan() || !(0.0..=2.0).contains(&t) {
            return Err(ConfigError::Validation(
                "caption.temperature must be in [0, 2]".into(),
            ));
        }
        if self.link.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "link.base_url must not be empty".into(),
            ));
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::Validation(
                "history.capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Compression settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Width bound in pixels. Narrower images keep their size.
    pub max_width: u32,
    /// Lossy quality in `(0, 1]`.
    pub quality: f32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            quality: 0.6,
        }
    }
}

impl CompressionConfig {
    pub fn to_compress_config(&self) -> CompressConfig {
        CompressConfig {
            max_width: self.max_width,
            quality: Quality::new(self.quality),
        }
    }
}

/// Caption service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// When false, shares carry no caption and no request is made.
    pub enabled: bool,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// API base, without the `/models/...` suffix.
    pub endpoint: String,
    pub model: String,
    /// Whole-request timeout. A timeout falls back like any other failure.
    pub timeout_secs: u64,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "API_KEY".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            timeout_secs: 8,
            max_output_tokens: 100,
            temperature: 0.7,
        }
    }
}

impl CaptionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key from the configured environment variable, if set and non-blank.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

/// Share link settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Origin the viewer is served from. Tokens go in `#/v/<token>`.
    pub base_url: String,
    /// Decode tokens written with a schema version this build doesn't know.
    pub accept_unknown_versions: bool,
    /// URLs longer than this get a warning; many clients truncate them.
    pub max_url_length: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://snaphost.app".to_string(),
            accept_unknown_versions: false,
            max_url_length: 32_768,
        }
    }
}

impl LinkConfig {
    pub fn version_policy(&self) -> VersionPolicy {
        if self.accept_unknown_versions {
            VersionPolicy::AcceptAny
        } else {
            VersionPolicy::CurrentOnly
        }
    }
}

/// Share history settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Number of most recent shares kept.
    pub capacity: usize,
    /// History file. When absent, `<data dir>/snaplink/history.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: crate::history::DEFAULT_CAPACITY,
            path: None,
        }
    }
}

impl HistoryConfig {
    /// Configured path, else the platform data dir. `None` when the
    /// platform has no data dir; history is then disabled.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR).join("history.json")))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Default config file location: `<config dir>/snaplink/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Every setting at its default, as a TOML table. A user file is laid over
/// this, so keys it leaves out keep their defaults.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Lay `user` over `defaults`.
///
/// Sections merge key by key, so `[link] base_url = ...` alone keeps the
/// other `[link]` defaults. A scalar the user sets replaces the default.
pub fn merge_toml(defaults: toml::Value, user: toml::Value) -> toml::Value {
    match (defaults, user) {
        (toml::Value::Table(mut section), toml::Value::Table(user_section)) => {
            for (key, user_value) in user_section {
                let value = match section.remove(&key) {
                    Some(default_value) => merge_toml(default_value, user_value),
                    None => user_value,
                };
                section.insert(key, value);
            }
            toml::Value::Table(section)
        }
        (_, user) => user,
    }
}

/// Parse the user's config file, or `None` when there is no such file.
pub fn read_user_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(toml::from_str(&content)?))
}

/// Build the effective config from an optional user table: defaults first,
/// user values on top, then typed deserialization (unknown keys fail) and
/// range validation.
pub fn resolve_config(user: Option<toml::Value>) -> Result<AppConfig, ConfigError> {
    let defaults = stock_defaults_value();
    let merged = match user {
        Some(user) => merge_toml(defaults, user),
        None => defaults,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    resolve_config(read_user_config(path)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# SnapLink Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# Images wider than this are scaled down (aspect ratio preserved).
# Narrower images keep their size; nothing is ever upscaled.
max_width = 800

# JPEG quality as a fraction, 0 < quality <= 1. Lower means shorter links.
quality = 0.6

# ---------------------------------------------------------------------------
# AI captions
# ---------------------------------------------------------------------------
[caption]
# Set to false to share without captions (no network request is made).
enabled = true

# Environment variable that holds the Gemini API key.
# Without a key, shares get a fixed fallback caption.
api_key_env = "API_KEY"

endpoint = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-3-flash-preview"

# Give up on the caption after this many seconds.
timeout_secs = 8

max_output_tokens = 100
temperature = 0.7

# ---------------------------------------------------------------------------
# Links
# ---------------------------------------------------------------------------
[link]
# Where the viewer lives. Links look like <base_url>/#/v/<token>.
base_url = "https://snaphost.app"

# Open links written by newer versions instead of rejecting them.
# They may render incorrectly.
accept_unknown_versions = false

# Warn when a link is longer than this. Many chat apps and browsers
# silently truncate very long URLs.
max_url_length = 32768

# ---------------------------------------------------------------------------
# History
# ---------------------------------------------------------------------------
[history]
# Number of most recent shares to remember.
capacity = 10

# History file location. Defaults to the platform data directory.
# path = "/home/me/.local/share/snaplink/history.json"
"##
}
