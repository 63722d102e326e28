//! Configuration file parser for the relay server.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as a warning, since they
//! are usually typos.
use serde::Deserialize;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

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

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level server configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to listen on.
    pub ip: IpAddr,

    /// Port to listen on.
    pub port: u16,

    /// Items enriched per request when the query has no `items_cap`.
    pub items_cap: usize,

    /// Largest `items_cap` a request may ask for.
    pub max_items_cap: usize,

    /// Default recency window, in days before the request time.
    pub from_days_ago: u32,

    /// Timeout for each feed or article download.
    pub fetch_timeout_secs: u64,

    /// Article downloads in flight per request.
    pub max_concurrent_fetches: usize,

    /// Appended to the relayed feed's title. Empty disables renaming.
    pub title_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            items_cap: 10,
            max_items_cap: 100,
            from_days_ago: 30,
            fetch_timeout_secs: 30,
            max_concurrent_fetches: 8,
            title_suffix: "(repacked by fullfeed)".to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Upper bounds keeping date and duration arithmetic in range.
    pub const MAX_FROM_DAYS_AGO: u32 = 36_500;
    pub const MAX_FETCH_TIMEOUT_SECS: u64 = 3_600;

    const KNOWN_KEYS: [&'static str; 8] = [
        "ip",
        "port",
        "items_cap",
        "max_items_cap",
        "from_days_ago",
        "fetch_timeout_secs",
        "max_concurrent_fetches",
        "title_suffix",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    ///
    /// The result is not validated; call [`Config::validate`] after CLI
    /// overrides have been applied.
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
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
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
        tracing::info!(
            path = %path.display(),
            port = config.port,
            items_cap = config.items_cap,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Checks the values that would make the server misbehave at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items_cap == 0 {
            return Err(ConfigError::Invalid("items_cap must be at least 1".into()));
        }
        if self.items_cap > self.max_items_cap {
            return Err(ConfigError::Invalid(format!(
                "items_cap ({}) exceeds max_items_cap ({})",
                self.items_cap, self.max_items_cap
            )));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_fetches must be at least 1".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be at least 1".into(),
            ));
        }
        if self.fetch_timeout_secs > Self::MAX_FETCH_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "fetch_timeout_secs must not exceed {}",
                Self::MAX_FETCH_TIMEOUT_SECS
            )));
        }
        if self.from_days_ago > Self::MAX_FROM_DAYS_AGO {
            return Err(ConfigError::Invalid(format!(
                "from_days_ago must not exceed {}",
                Self::MAX_FROM_DAYS_AGO
            )));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Concurrency gate width. Falls back to 1 on an unvalidated zero.
    pub fn concurrency(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_concurrent_fetches).unwrap_or(NonZeroUsize::MIN)
    }
}

// ============================================================================
// Tests
// ============================================================================
