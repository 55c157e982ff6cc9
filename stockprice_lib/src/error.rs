//! Error types for the library layer.

use std::fmt;

use crate::config::ConfigError;
use crate::db::DbError;
use crate::record::BatchError;

/// Errors that end a pipeline run.
///
/// Fetch errors happen before the database is touched. Load errors are
/// returned only after the transaction has been rolled back. Per-quote
/// conversion failures never surface here.
#[derive(Debug)]
pub enum PipelineError {
    /// The run configuration is invalid or incomplete.
    Config(ConfigError),
    /// The provider request failed or returned no daily series.
    Fetch(alphavantage_api::Error),
    /// The transformed records did not form a single-symbol batch.
    Batch(BatchError),
    /// Opening the database or the load transaction failed.
    Load(DbError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {}", e),
            Self::Fetch(e) => write!(f, "Fetch failed: {}", e),
            Self::Batch(e) => write!(f, "Invalid batch: {}", e),
            Self::Load(e) => write!(f, "Load failed: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Fetch(e) => Some(e),
            Self::Batch(e) => Some(e),
            Self::Load(e) => Some(e),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<alphavantage_api::Error> for PipelineError {
    fn from(e: alphavantage_api::Error) -> Self {
        Self::Fetch(e)
    }
}

impl From<BatchError> for PipelineError {
    fn from(e: BatchError) -> Self {
        Self::Batch(e)
    }
}

impl From<DbError> for PipelineError {
    fn from(e: DbError) -> Self {
        Self::Load(e)
    }
}
