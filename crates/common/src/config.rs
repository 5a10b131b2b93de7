//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Text generation configuration.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Export sink configuration.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// What to do with model output longer than the requested character limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPolicy {
    /// Keep the model's text as returned.
    #[default]
    Trust,
    /// Cut the text down to the limit (counted in characters).
    Truncate,
}

/// Text generation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the generative language API.
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key. Generation is unavailable without it.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Delay between two consecutive generation calls, in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// Request timeout for one generation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// IANA timezone used to stamp drafts.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Post-hoc handling of over-long output.
    #[serde(default)]
    pub length_policy: LengthPolicy,
}

/// Export sink configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// URL of the spreadsheet bridge accepting appended rows.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token for the bridge. Export is unavailable without it.
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite://castroom.db?mode=rwc".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_min_connections() -> u32 {
    1
}

fn default_generation_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

const fn default_pacing_ms() -> u64 {
    2000
}

const fn default_timeout_secs() -> u64 {
    60
}

fn default_timezone() -> String {
    "Asia/Tokyo".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generation_endpoint(),
            model: default_model(),
            api_key: None,
            pacing_ms: default_pacing_ms(),
            timeout_secs: default_timeout_secs(),
            timezone: default_timezone(),
            length_policy: LengthPolicy::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    /// Pacing delay as a [`Duration`].
    #[must_use]
    pub const fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Parse the configured timezone.
    pub fn tz(&self) -> AppResult<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Config(format!("Unknown timezone: {}", self.timezone)))
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `CASTROOM_ENV`)
    /// 3. Environment variables with `CASTROOM__` prefix (a `.env` file is
    ///    read first when present)
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("CASTROOM_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CASTROOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CASTROOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// Pacing must be non-zero: the generation API is rate limited.
    pub fn validate(&self) -> AppResult<()> {
        if self.generation.pacing_ms == 0 {
            return Err(AppError::Config(
                "generation.pacing_ms must be greater than zero".to_string(),
            ));
        }
        self.generation.tz()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation.pacing(), Duration::from_secs(2));
        assert_eq!(config.generation.length_policy, LengthPolicy::Trust);
        assert!(config.export.token.is_none());
    }

    #[test]
    fn test_zero_pacing_rejected() {
        let mut config = Config::default();
        config.generation.pacing_ms = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let mut config = Config::default();
        config.generation.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_known_timezone_parses() {
        let config = GenerationConfig::default();
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Tokyo);
    }
}
