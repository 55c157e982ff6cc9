//! Library layer for the stock price ETL: configuration, the extract,
//! transform and load stages, and the SQLite destination.
//!
//! Wraps the `alphavantage_api` client with a trailing-window extractor,
//! converts provider quotes into typed [`PriceRecord`]s and replaces the
//! destination table's contents inside one transaction.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod record;
pub mod transform;
pub mod validation;

pub use alphavantage_api;
pub use alphavantage_api::OutputSize;

pub use config::{ConfigError, PipelineConfig, PipelineSettings};
pub use db::{Db, DbError, DeleteScope, LoadReport};
pub use error::PipelineError;
pub use extract::{cutoff_date, extract, RawDailyQuote};
pub use pipeline::{run_pipeline, run_with, RunReport};
pub use record::{BatchError, LoadBatch, PriceRecord};
pub use transform::{transform, transform_quote, ConversionError};
pub use validation::TableName;
