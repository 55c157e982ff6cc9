mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "stockprice")]
#[command(about = "Load recent daily stock prices from Alpha Vantage into SQLite")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, convert and load the trailing price window once
    Run(commands::run::RunArgs),
    /// Create the destination table if it does not exist
    Init(commands::init::InitArgs),
    /// List stored prices
    Prices(commands::prices::PricesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already carry the key.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stockprice_lib=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Run(args) => commands::run::run(args, &cli.output).await?,
        Commands::Init(args) => commands::init::run(args)?,
        Commands::Prices(args) => commands::prices::run(args, &cli.output)?,
    }

    Ok(())
}
