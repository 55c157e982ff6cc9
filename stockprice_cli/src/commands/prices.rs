//! The `prices` subcommand: list what the last run stored.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use stockprice_lib::validation::validate_symbol;
use stockprice_lib::{Db, TableName};

use crate::output::{
    print_json, print_prices_csv, print_prices_markdown, print_prices_table, OutputFormat,
};

#[derive(Args)]
pub struct PricesArgs {
    /// SQLite database path
    #[arg(long, default_value = "stock_prices.db")]
    pub db: PathBuf,

    /// Destination table
    #[arg(long, default_value = "stock_price")]
    pub table: String,

    /// Only rows for this symbol
    #[arg(long)]
    pub symbol: Option<String>,
}

pub fn run(args: &PricesArgs, format: &OutputFormat) -> Result<()> {
    if !args.db.exists() {
        bail!(
            "database {} does not exist. Run 'stockprice run --db {}' first.",
            args.db.display(),
            args.db.display()
        );
    }
    let table = TableName::new(&args.table)?;
    let symbol = args.symbol.as_deref().map(validate_symbol).transpose()?;
    let db = Db::open(&args.db)?;
    let records = db.prices(&table, symbol.as_deref())?;

    if records.is_empty() {
        eprintln!("No prices stored in {}", table);
    }

    match format {
        OutputFormat::Table => print_prices_table(&records),
        OutputFormat::Markdown => print_prices_markdown(&records),
        OutputFormat::Csv => print_prices_csv(&records)?,
        OutputFormat::Json => print_json(&records),
    }

    Ok(())
}
