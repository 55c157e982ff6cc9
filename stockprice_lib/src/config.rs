//! Run configuration.
//!
//! A run is described by a [`PipelineConfig`] built once at startup from an
//! optional TOML settings file layered under command-line overrides. The
//! provider API key comes from an environment variable whose name is itself
//! configurable, so the file never holds the secret.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alphavantage_api::OutputSize;
use serde::Deserialize;

use crate::db::DeleteScope;
use crate::validation::{self, TableName};

pub const DEFAULT_SYMBOL: &str = "NVDA";
pub const DEFAULT_DATABASE: &str = "stock_prices.db";
pub const DEFAULT_API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Overrides the provider base URL when no setting names one.
pub const BASE_URL_ENV: &str = "ALPHAVANTAGE_BASE_URL";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("API key not set: environment variable {0} is missing or empty")]
    MissingApiKey(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Optional settings, as read from a TOML file or assembled from CLI flags.
///
/// ```toml
/// symbol = "NVDA"
/// database = "/var/lib/stockprice/prices.db"
/// table = "stock_price"
/// window_days = 90
/// output_size = "compact"
/// delete_scope = "table"
/// api_key_env = "ALPHAVANTAGE_API_KEY"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSettings {
    pub symbol: Option<String>,
    pub database: Option<PathBuf>,
    pub table: Option<String>,
    pub window_days: Option<u32>,
    pub output_size: Option<OutputSize>,
    pub delete_scope: Option<DeleteScope>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl PipelineSettings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Layers `overrides` on top of `self`; fields set in `overrides` win.
    pub fn merge(self, overrides: PipelineSettings) -> PipelineSettings {
        PipelineSettings {
            symbol: overrides.symbol.or(self.symbol),
            database: overrides.database.or(self.database),
            table: overrides.table.or(self.table),
            window_days: overrides.window_days.or(self.window_days),
            output_size: overrides.output_size.or(self.output_size),
            delete_scope: overrides.delete_scope.or(self.delete_scope),
            api_key_env: overrides.api_key_env.or(self.api_key_env),
            base_url: overrides.base_url.or(self.base_url),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Name of the environment variable holding the provider API key.
    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    /// Resolves the API key from the environment and validates everything.
    pub fn resolve(self) -> Result<PipelineConfig, ConfigError> {
        let api_key = read_api_key(self.api_key_env())?;
        let mut settings = self;
        if settings.base_url.is_none() {
            settings.base_url = std::env::var(BASE_URL_ENV).ok().filter(|v| !v.is_empty());
        }
        settings.resolve_with_key(api_key)
    }

    /// Validates the settings with an already-resolved API key, filling defaults.
    pub fn resolve_with_key(self, api_key: String) -> Result<PipelineConfig, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(self.api_key_env().to_string()));
        }
        let symbol = validation::validate_symbol(self.symbol.as_deref().unwrap_or(DEFAULT_SYMBOL))?;
        let table = match self.table.as_deref() {
            Some(name) => TableName::new(name)?,
            None => TableName::default(),
        };
        let window_days = validation::validate_window_days(
            self.window_days.unwrap_or(validation::DEFAULT_WINDOW_DAYS),
        )?;
        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidInput(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(PipelineConfig {
            symbol,
            api_key: api_key.trim().to_string(),
            database: self
                .database
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            table,
            window_days,
            output_size: self.output_size.unwrap_or_default(),
            delete_scope: self.delete_scope.unwrap_or_default(),
            base_url: self.base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Reads a non-empty API key from `var`.
pub fn read_api_key(var: &str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingApiKey(var.to_string()))
}

/// Everything one run needs, validated. Passed by reference into each stage.
#[derive(Clone)]
pub struct PipelineConfig {
    pub symbol: String,
    pub api_key: String,
    pub database: PathBuf,
    pub table: TableName,
    pub window_days: u32,
    pub output_size: OutputSize,
    pub delete_scope: DeleteScope,
    /// Provider base URL; `None` uses the production endpoint.
    pub base_url: Option<String>,
    pub request_timeout: Duration,
}

impl PipelineConfig {
    /// A config with defaults for everything but the symbol, key and database.
    pub fn new(
        symbol: &str,
        api_key: impl Into<String>,
        database: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        PipelineSettings {
            symbol: Some(symbol.to_string()),
            database: Some(database.into()),
            ..Default::default()
        }
        .resolve_with_key(api_key.into())
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("symbol", &self.symbol)
            .field("api_key", &"<redacted>")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("window_days", &self.window_days)
            .field("output_size", &self.output_size)
            .field("delete_scope", &self.delete_scope)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_settings() {
        let config = PipelineSettings::default()
            .resolve_with_key("key".to_string())
            .unwrap();
        assert_eq!(config.symbol, "NVDA");
        assert_eq!(config.database, PathBuf::from("stock_prices.db"));
        assert_eq!(config.table.as_str(), "stock_price");
        assert_eq!(config.window_days, 90);
        assert_eq!(config.output_size, OutputSize::Compact);
        assert_eq!(config.delete_scope, DeleteScope::Table);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.base_url.is_none());
    }

    #[test]
    fn parses_full_toml() {
        let settings = PipelineSettings::from_toml_str(
            r#"
            symbol = "ibm"
            database = "/tmp/prices.db"
            table = "raw_stock_price"
            window_days = 30
            output_size = "full"
            delete_scope = "symbol"
            api_key_env = "AV_KEY"
            base_url = "http://localhost:8080"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(settings.api_key_env(), "AV_KEY");

        let config = settings.resolve_with_key("k".to_string()).unwrap();
        assert_eq!(config.symbol, "IBM");
        assert_eq!(config.table.as_str(), "raw_stock_price");
        assert_eq!(config.window_days, 30);
        assert_eq!(config.output_size, OutputSize::Full);
        assert_eq!(config.delete_scope, DeleteScope::Symbol);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PipelineSettings::from_toml_str("symbl = \"NVDA\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = PipelineSettings {
            symbol: Some("IBM".to_string()),
            window_days: Some(30),
            ..Default::default()
        };
        let cli = PipelineSettings {
            symbol: Some("NVDA".to_string()),
            ..Default::default()
        };
        let merged = file.merge(cli);
        assert_eq!(merged.symbol.as_deref(), Some("NVDA"));
        assert_eq!(merged.window_days, Some(30));
    }

    #[test]
    fn empty_key_is_missing() {
        let err = PipelineSettings::default()
            .resolve_with_key("  ".to_string())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(ref v) if v == "ALPHAVANTAGE_API_KEY"));
    }

    #[test]
    fn read_api_key_from_env() {
        std::env::set_var("STOCKPRICE_TEST_KEY_PRESENT", " abc123 ");
        assert_eq!(read_api_key("STOCKPRICE_TEST_KEY_PRESENT").unwrap(), "abc123");
        assert!(matches!(
            read_api_key("STOCKPRICE_TEST_KEY_ABSENT"),
            Err(ConfigError::MissingApiKey(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_window = PipelineSettings {
            window_days: Some(0),
            ..Default::default()
        };
        assert!(bad_window.resolve_with_key("k".to_string()).is_err());

        let bad_timeout = PipelineSettings {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(bad_timeout.resolve_with_key("k".to_string()).is_err());

        let bad_table = PipelineSettings {
            table: Some("prices; --".to_string()),
            ..Default::default()
        };
        assert!(bad_table.resolve_with_key("k".to_string()).is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let config = PipelineConfig::new("NVDA", "super-secret", "x.db").unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PipelineSettings::load(Path::new("/nonexistent/stockprice.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/stockprice.toml"));
    }

    #[test]
    fn sample_settings_file_parses() {
        let settings =
            PipelineSettings::from_toml_str(include_str!("../../stockprice.example.toml")).unwrap();
        let config = settings.resolve_with_key("k".to_string()).unwrap();
        assert_eq!(config.symbol, "NVDA");
        assert_eq!(config.window_days, 90);
        assert_eq!(config.delete_scope, DeleteScope::Table);
        assert_eq!(config.output_size, OutputSize::Compact);
    }
}
