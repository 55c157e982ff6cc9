use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use stockprice_lib::{PriceRecord, RunReport};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    #[value(alias = "md")]
    Markdown,
}

#[derive(Tabled, Serialize)]
struct PriceRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Open")]
    #[serde(rename = "Open")]
    open: String,
    #[tabled(rename = "High")]
    #[serde(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    #[serde(rename = "Low")]
    low: String,
    #[tabled(rename = "Close")]
    #[serde(rename = "Close")]
    close: String,
    #[tabled(rename = "Volume")]
    #[serde(rename = "Volume")]
    volume: String,
}

/// CSV keeps volume as a plain integer so the column stays numeric.
#[derive(Serialize)]
struct PriceCsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "High")]
    high: String,
    #[serde(rename = "Low")]
    low: String,
    #[serde(rename = "Close")]
    close: String,
    #[serde(rename = "Volume")]
    volume: u64,
}

#[derive(Tabled, Serialize)]
struct RunRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Table")]
    #[serde(rename = "Table")]
    table: String,
    #[tabled(rename = "Cutoff")]
    #[serde(rename = "Cutoff")]
    cutoff: String,
    #[tabled(rename = "Extracted")]
    #[serde(rename = "Extracted")]
    extracted: usize,
    #[tabled(rename = "Skipped")]
    #[serde(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Deleted")]
    #[serde(rename = "Deleted")]
    deleted: usize,
    #[tabled(rename = "Loaded")]
    #[serde(rename = "Loaded")]
    loaded: usize,
}

fn build_price_rows(records: &[PriceRecord]) -> Vec<PriceRow> {
    records
        .iter()
        .map(|r| PriceRow {
            date: r.date.to_string(),
            symbol: r.symbol.clone(),
            open: r.open.to_string(),
            high: r.high.to_string(),
            low: r.low.to_string(),
            close: r.close.to_string(),
            volume: format_volume(r.volume),
        })
        .collect()
}

fn build_price_csv_rows(records: &[PriceRecord]) -> Vec<PriceCsvRow> {
    records
        .iter()
        .map(|r| PriceCsvRow {
            date: r.date.to_string(),
            symbol: r.symbol.clone(),
            open: r.open.to_string(),
            high: r.high.to_string(),
            low: r.low.to_string(),
            close: r.close.to_string(),
            volume: r.volume,
        })
        .collect()
}

fn build_run_row(report: &RunReport) -> RunRow {
    RunRow {
        symbol: report.symbol.clone(),
        table: report.load.table.clone(),
        cutoff: report.cutoff.to_string(),
        extracted: report.extracted,
        skipped: report.skipped,
        deleted: report.load.deleted,
        loaded: report.loaded(),
    }
}

// -- Table output --

pub fn print_prices_table(records: &[PriceRecord]) {
    println!("{}", Table::new(build_price_rows(records)));
}

// -- Markdown output --

pub fn print_prices_markdown(records: &[PriceRecord]) {
    let mut table = Table::new(build_price_rows(records));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_prices_csv(records: &[PriceRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_price_csv_rows(records) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- Run summary --

pub fn print_run_report(report: &RunReport, format: &OutputFormat) -> Result<()> {
    let rows = vec![build_run_row(report)];
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => print_json(report),
    }
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Groups digits in threes: `41456806` becomes `41,456,806`.
fn format_volume(volume: u64) -> String {
    let digits = volume.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
