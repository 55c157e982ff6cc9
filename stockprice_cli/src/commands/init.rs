//! The `init` subcommand: create the destination table ahead of the first run.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use stockprice_lib::{Db, TableName};

#[derive(Args)]
pub struct InitArgs {
    /// SQLite database path
    #[arg(long, default_value = "stock_prices.db")]
    pub db: PathBuf,

    /// Destination table
    #[arg(long, default_value = "stock_price")]
    pub table: String,
}

pub fn run(args: &InitArgs) -> Result<()> {
    let table = TableName::new(&args.table)?;
    let db = Db::open(&args.db)?;
    db.ensure_price_table(&table)?;
    let rows = db.price_count(&table)?;
    eprintln!(
        "Table {} ready in {} ({} rows)",
        table,
        args.db.display(),
        rows
    );
    Ok(())
}
