//! Configuration file parser for `readshelf.toml`.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
//!
//! Command-line flags are applied on top of the loaded file by the binary,
//! and [`Config::resolve`] turns the result into a validated [`SyncConfig`].
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::goodreads::{DatePolicy, ShelfRequest, SourceKind};
use crate::site::{WriteOptions, DEFAULT_LAYOUT};
use crate::sync::SyncConfig;
use crate::util::{validate_base_url, UrlValidationError};

/// Environment variable holding the Goodreads developer key.
pub const API_KEY_ENV: &str = "GOODREADS_KEY";

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "readshelf.toml";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("No Goodreads user id configured (set user_id or pass --user-id)")]
    MissingUserId,

    #[error("Requires env property GOODREADS_KEY (or api_key in the config file) for the keyed API")]
    MissingApiKey,

    #[error("Invalid base_url: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level export configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
///
/// SEC-015: Custom Debug impl masks `api_key` to prevent secret leakage
/// in logs, error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which endpoint to read: `"rss"` or `"api"`.
    pub source: SourceKind,

    /// Service root, without the `/review/...` path.
    pub base_url: String,

    /// Goodreads numeric user id.
    pub user_id: Option<u64>,

    /// Directory pages are written into. Must already exist.
    pub output_dir: PathBuf,

    /// Value of the `layout` front-matter key.
    pub layout: String,

    /// Eligibility rule for undated entries. Defaults per source when unset.
    pub date_policy: Option<DatePolicy>,

    /// HTTP timeout in seconds. Unset = client defaults.
    pub request_timeout_secs: Option<u64>,

    /// Developer key (alternative to GOODREADS_KEY env var).
    /// Env var takes precedence over config file.
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::Rss,
            base_url: "https://www.goodreads.com".to_string(),
            user_id: None,
            output_dir: PathBuf::from("_read_books"),
            layout: DEFAULT_LAYOUT.to_string(),
            date_policy: None,
            request_timeout_secs: None,
            api_key: None,
        }
    }
}

/// SEC-015: Mask api_key in Debug output to prevent secret leakage.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("source", &self.source)
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .field("output_dir", &self.output_dir)
            .field("layout", &self.layout)
            .field("date_policy", &self.date_policy)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
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
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "source",
                "base_url",
                "user_id",
                "output_dir",
                "layout",
                "date_policy",
                "request_timeout_secs",
                "api_key",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), source = %config.source, "Loaded configuration");
        Ok(config)
    }

    /// Validates the configuration and produces the settings for one run.
    ///
    /// `env_api_key` is the value of [`API_KEY_ENV`], if set; a non-empty
    /// value wins over `api_key` from the file. Fails before any network
    /// activity when the keyed API is selected without a key.
    pub fn resolve(self, env_api_key: Option<String>) -> Result<SyncConfig, ConfigError> {
        let user_id = self.user_id.ok_or(ConfigError::MissingUserId)?;

        let api_key = env_api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.filter(|k| !k.trim().is_empty()))
            .map(SecretString::from);

        let api_key = match self.source {
            SourceKind::Api => Some(api_key.ok_or(ConfigError::MissingApiKey)?),
            SourceKind::Rss => None,
        };

        let base_url = validate_base_url(&self.base_url, api_key.is_some())?;
        let date_policy = self
            .date_policy
            .unwrap_or_else(|| self.source.default_date_policy());

        Ok(SyncConfig {
            shelf: ShelfRequest {
                base_url,
                user_id,
                source: self.source,
                api_key,
            },
            write: WriteOptions {
                output_dir: self.output_dir,
                layout: self.layout,
                date_policy,
            },
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
