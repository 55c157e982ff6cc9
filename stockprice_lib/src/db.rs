//! SQLite destination for price records.
//!
//! The load is a full replace inside one transaction: create the table if
//! absent, delete the existing rows, insert the batch, commit. Any failure in
//! between rolls the transaction back and leaves the table as it was.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::extract::DATE_FORMAT;
use crate::record::{LoadBatch, PriceRecord};
use crate::transform::PRICE_SCALE;
use crate::validation::TableName;

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("date parse error: {0}")]
    Date(#[from] chrono::ParseError),
    #[error("decimal parse error: {0}")]
    Decimal(#[from] rust_decimal::Error),
    #[error("volume {0} does not fit BIGINT")]
    VolumeOverflow(u64),
    #[error("invalid stored row: {0}")]
    InvalidRow(String),
}

/// Which rows the load deletes before inserting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteScope {
    /// Every row in the table, whatever its symbol.
    #[default]
    Table,
    /// Only rows for the batch's symbol.
    Symbol,
}

impl DeleteScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteScope::Table => "table",
            DeleteScope::Symbol => "symbol",
        }
    }
}

impl fmt::Display for DeleteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeleteScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(DeleteScope::Table),
            "symbol" => Ok(DeleteScope::Symbol),
            other => Err(format!(
                "unknown delete scope '{}' (expected table or symbol)",
                other
            )),
        }
    }
}

/// Outcome of a committed load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub table: String,
    pub symbol: String,
    pub scope: DeleteScope,
    pub deleted: usize,
    /// Deleted rows that belonged to symbols other than the batch's.
    pub other_symbols_deleted: usize,
    pub inserted: usize,
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for tests).
    #[doc(hidden)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Creates the destination table if it does not exist.
    pub fn ensure_price_table(&self, table: &TableName) -> Result<(), DbError> {
        self.conn.execute_batch(&create_table_sql(table))?;
        Ok(())
    }

    /// Replaces the table's contents with `batch` in a single transaction.
    ///
    /// With [`DeleteScope::Table`] every existing row is removed, including
    /// rows for other symbols; a warning is logged when any exist. The
    /// transaction is rolled back on any error, which is then returned.
    pub fn replace_prices(
        &mut self,
        table: &TableName,
        batch: LoadBatch,
        scope: DeleteScope,
    ) -> Result<LoadReport, DbError> {
        let tx = self.conn.transaction()?;

        match write_batch(&tx, table, &batch, scope) {
            Ok(Deleted { total, other_symbols }) => {
                tx.commit()?;
                let report = LoadReport {
                    table: table.to_string(),
                    symbol: batch.symbol().to_string(),
                    scope,
                    deleted: total,
                    other_symbols_deleted: other_symbols,
                    inserted: batch.len(),
                };
                tracing::info!(
                    table = %report.table,
                    symbol = %report.symbol,
                    deleted = report.deleted,
                    inserted = report.inserted,
                    "loaded {} rows into {}",
                    report.inserted,
                    report.table
                );
                Ok(report)
            }
            Err(err) => {
                tracing::error!(
                    table = %table,
                    symbol = batch.symbol(),
                    error = %err,
                    "load failed, rolling back"
                );
                if let Err(rollback_err) = tx.rollback() {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Stored records ordered by symbol then date, optionally for one symbol.
    pub fn prices(
        &self,
        table: &TableName,
        symbol: Option<&str>,
    ) -> Result<Vec<PriceRecord>, DbError> {
        let mut sql = format!(
            "SELECT symbol, date, CAST(open AS TEXT), CAST(close AS TEXT),
                    CAST(high AS TEXT), CAST(low AS TEXT), volume
             FROM {}",
            table.quoted()
        );
        if symbol.is_some() {
            sql.push_str(" WHERE symbol = ?1");
        }
        sql.push_str(" ORDER BY symbol, date");

        let mut stmt = self.conn.prepare(&sql)?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<StoredRow> {
            Ok(StoredRow {
                symbol: row.get(0)?,
                date: row.get(1)?,
                open: row.get(2)?,
                close: row.get(3)?,
                high: row.get(4)?,
                low: row.get(5)?,
                volume: row.get(6)?,
            })
        };
        let rows = match symbol {
            Some(symbol) => stmt
                .query_map(params![symbol], map_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?,
        };

        rows.into_iter().map(StoredRow::into_record).collect()
    }

    pub fn price_count(&self, table: &TableName) -> Result<i64, DbError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(1) FROM {}", table.quoted()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn create_table_sql(table: &TableName) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            symbol VARCHAR(10) NOT NULL,
            date DATE NOT NULL,
            open DECIMAL(12,4) NOT NULL,
            close DECIMAL(12,4) NOT NULL,
            high DECIMAL(12,4) NOT NULL,
            low DECIMAL(12,4) NOT NULL,
            volume BIGINT NOT NULL,
            PRIMARY KEY (symbol, date)
        );",
        table.quoted()
    )
}

/// Rows removed by the delete step of a load.
struct Deleted {
    total: usize,
    other_symbols: usize,
}

/// Schema, delete and insert steps of a load.
fn write_batch(
    tx: &Transaction<'_>,
    table: &TableName,
    batch: &LoadBatch,
    scope: DeleteScope,
) -> Result<Deleted, DbError> {
    let quoted = table.quoted();
    tx.execute_batch(&create_table_sql(table))?;

    let deleted = match scope {
        DeleteScope::Table => {
            let others: i64 = tx.query_row(
                &format!("SELECT COUNT(1) FROM {} WHERE symbol != ?1", quoted),
                params![batch.symbol()],
                |row| row.get(0),
            )?;
            if others > 0 {
                tracing::warn!(
                    table = %table,
                    symbol = batch.symbol(),
                    others,
                    "replace-all load is deleting rows that belong to other symbols"
                );
            }
            Deleted {
                total: tx.execute(&format!("DELETE FROM {}", quoted), [])?,
                other_symbols: usize::try_from(others).unwrap_or(0),
            }
        }
        DeleteScope::Symbol => Deleted {
            total: tx.execute(
                &format!("DELETE FROM {} WHERE symbol = ?1", quoted),
                params![batch.symbol()],
            )?,
            other_symbols: 0,
        },
    };

    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {} (symbol, date, open, close, high, low, volume)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        quoted
    ))?;
    for record in batch.records() {
        let volume =
            i64::try_from(record.volume).map_err(|_| DbError::VolumeOverflow(record.volume))?;
        stmt.execute(params![
            record.symbol,
            record.date.format(DATE_FORMAT).to_string(),
            record.open.to_string(),
            record.close.to_string(),
            record.high.to_string(),
            record.low.to_string(),
            volume,
        ])?;
    }

    Ok(deleted)
}

/// A row as SQLite hands it back, before typing.
struct StoredRow {
    symbol: String,
    date: String,
    open: String,
    close: String,
    high: String,
    low: String,
    volume: i64,
}

impl StoredRow {
    fn into_record(self) -> Result<PriceRecord, DbError> {
        let volume = u64::try_from(self.volume).map_err(|_| {
            DbError::InvalidRow(format!(
                "negative volume {} for {} on {}",
                self.volume, self.symbol, self.date
            ))
        })?;
        Ok(PriceRecord {
            date: NaiveDate::parse_from_str(&self.date, DATE_FORMAT)?,
            open: parse_stored_decimal(&self.open)?,
            close: parse_stored_decimal(&self.close)?,
            high: parse_stored_decimal(&self.high)?,
            low: parse_stored_decimal(&self.low)?,
            volume,
            symbol: self.symbol,
        })
    }
}

/// SQLite hands NUMERIC columns back without trailing zeros; restore the column scale.
fn parse_stored_decimal(text: &str) -> Result<Decimal, DbError> {
    let mut value = Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text))?;
    value.rescale(PRICE_SCALE);
    Ok(value)
}
