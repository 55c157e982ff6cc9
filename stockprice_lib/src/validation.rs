use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::config::ConfigError;

/// Matches the destination's `VARCHAR(10)` symbol column.
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const DEFAULT_WINDOW_DAYS: u32 = 90;
pub const MAX_WINDOW_DAYS: u32 = 3650;
pub const DEFAULT_TABLE: &str = "stock_price";

/// Normalize and validate a ticker symbol: trimmed, upper-cased, 1 to 10
/// characters of `A-Z`, `0-9`, `.` or `-`.
pub fn validate_symbol(input: &str) -> Result<String, ConfigError> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ConfigError::InvalidInput("symbol cannot be empty".to_string()));
    }
    if symbol.len() > MAX_SYMBOL_LENGTH {
        return Err(ConfigError::InvalidInput(format!(
            "symbol '{}' exceeds {} characters",
            symbol, MAX_SYMBOL_LENGTH
        )));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidInput(format!(
            "symbol '{}' contains invalid characters",
            symbol
        )));
    }
    Ok(symbol)
}

/// Validate the lookback window: must be 1..=3650 days (approx 10 years).
pub fn validate_window_days(days: u32) -> Result<u32, ConfigError> {
    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(ConfigError::InvalidInput(format!(
            "window must be between 1 and {} days, got {}",
            MAX_WINDOW_DAYS, days
        )));
    }
    Ok(days)
}

/// A destination table name that is safe to splice into SQL.
///
/// Table names cannot be bound as statement parameters, so they are
/// restricted to plain identifiers and always emitted double-quoted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let trimmed = name.trim();
        let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$")
            .map_err(|e| ConfigError::InvalidInput(format!("identifier pattern: {}", e)))?;
        if !re.is_match(trimmed) {
            return Err(ConfigError::InvalidInput(format!(
                "invalid table name '{}'. Use letters, digits and underscores",
                trimmed
            )));
        }
        if trimmed.to_lowercase().starts_with("sqlite_") {
            return Err(ConfigError::InvalidInput(format!(
                "table name '{}' uses the reserved sqlite_ prefix",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TableName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
