//! Pipeline orchestration: extract, transform, load, strictly in sequence.

use alphavantage_api::Client;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::db::{Db, LoadReport};
use crate::error::PipelineError;
use crate::extract::{cutoff_date, extract};
use crate::record::{LoadBatch, PriceRecord};
use crate::transform::transform;

/// Counts for one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub symbol: String,
    pub cutoff: NaiveDate,
    /// Quotes inside the window.
    pub extracted: usize,
    /// Quotes dropped by the transformer.
    pub skipped: usize,
    pub load: LoadReport,
}

impl RunReport {
    /// Rows written to the destination table.
    pub fn loaded(&self) -> usize {
        self.load.inserted
    }
}

/// Runs the pipeline once with the production clock.
///
/// The database is opened only after extraction and transformation have
/// succeeded, so a fetch failure never touches it.
pub async fn run_pipeline(config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    let today = Local::now().date_naive();
    let client = client_for(config)?;
    let staged = stage(&client, config, today).await?;
    let mut db = Db::open(&config.database)?;
    staged.load(&mut db, config)
}

/// Runs the pipeline against an existing client and database, as of `today`.
pub async fn run_with(
    client: &Client,
    db: &mut Db,
    config: &PipelineConfig,
    today: NaiveDate,
) -> Result<RunReport, PipelineError> {
    let staged = stage(client, config, today).await?;
    staged.load(db, config)
}

/// Builds the provider client the config describes.
pub fn client_for(config: &PipelineConfig) -> Result<Client, PipelineError> {
    let base_url = config
        .base_url
        .as_deref()
        .unwrap_or(alphavantage_api::DEFAULT_BASE_URL);
    Ok(Client::with_timeout(
        base_url,
        config.api_key.clone(),
        config.request_timeout,
    )?)
}

/// Output of the extract and transform stages, waiting to be loaded.
struct Staged {
    cutoff: NaiveDate,
    extracted: usize,
    records: Vec<PriceRecord>,
}

async fn stage(
    client: &Client,
    config: &PipelineConfig,
    today: NaiveDate,
) -> Result<Staged, PipelineError> {
    tracing::info!(
        symbol = %config.symbol,
        table = %config.table,
        window_days = config.window_days,
        "starting run"
    );
    let quotes = extract(
        client,
        &config.symbol,
        config.output_size,
        config.window_days,
        today,
    )
    .await?;
    let records = transform(&config.symbol, &quotes);
    Ok(Staged {
        cutoff: cutoff_date(today, config.window_days),
        extracted: quotes.len(),
        records,
    })
}

impl Staged {
    fn load(self, db: &mut Db, config: &PipelineConfig) -> Result<RunReport, PipelineError> {
        let skipped = self.extracted - self.records.len();
        let batch = LoadBatch::new(config.symbol.clone(), self.records)?;
        let load = db.replace_prices(&config.table, batch, config.delete_scope)?;
        Ok(RunReport {
            symbol: config.symbol.clone(),
            cutoff: self.cutoff,
            extracted: self.extracted,
            skipped,
            load,
        })
    }
}
