//! The `run` subcommand: one extract, transform and load pass.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stockprice_lib::{run_pipeline, DeleteScope, OutputSize, PipelineSettings};

use crate::output::{print_run_report, OutputFormat};

/// Arguments for the `run` subcommand. Flags override the settings file.
#[derive(Args)]
pub struct RunArgs {
    /// TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ticker symbol (default: NVDA)
    #[arg(long)]
    pub symbol: Option<String>,

    /// SQLite database path (default: stock_prices.db)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Destination table (default: stock_price)
    #[arg(long)]
    pub table: Option<String>,

    /// Trailing window in calendar days (default: 90)
    #[arg(long)]
    pub window_days: Option<u32>,

    /// Provider output size: compact or full (default: compact)
    #[arg(long)]
    pub output_size: Option<OutputSize>,

    /// Rows deleted before insert: table (all rows) or symbol (default: table)
    #[arg(long)]
    pub delete_scope: Option<DeleteScope>,

    /// Environment variable holding the API key (default: ALPHAVANTAGE_API_KEY)
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl RunArgs {
    fn overrides(&self) -> PipelineSettings {
        PipelineSettings {
            symbol: self.symbol.clone(),
            database: self.db.clone(),
            table: self.table.clone(),
            window_days: self.window_days,
            output_size: self.output_size,
            delete_scope: self.delete_scope,
            api_key_env: self.api_key_env.clone(),
            base_url: None,
            timeout_secs: self.timeout_secs,
        }
    }
}

pub async fn run(args: &RunArgs, format: &OutputFormat) -> Result<()> {
    let file = match &args.config {
        Some(path) => PipelineSettings::load(path)?,
        None => PipelineSettings::default(),
    };
    let config = file.merge(args.overrides()).resolve()?;

    eprintln!(
        "Loading {} ({}-day window) into {} at {}",
        config.symbol,
        config.window_days,
        config.table,
        config.database.display()
    );
    if config.delete_scope == DeleteScope::Symbol {
        eprintln!("Note: only {} rows will be replaced", config.symbol);
    }

    let report = run_pipeline(&config)
        .await
        .with_context(|| format!("run for {} failed", config.symbol))?;

    eprintln!(
        "Loaded {} rows into {} ({} quotes since {}, {} skipped, {} rows replaced)",
        report.loaded(),
        report.load.table,
        report.extracted,
        report.cutoff,
        report.skipped,
        report.load.deleted
    );

    print_run_report(&report, format)?;

    Ok(())
}
