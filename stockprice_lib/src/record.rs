//! Typed records that flow from the transformer into the loader.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One day of OHLCV data for one symbol. The unit the destination table stores.
///
/// Prices are `Decimal` rounded to the table's four decimal places, so a
/// record read back from storage compares equal to the one written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: u64,
}

impl PriceRecord {
    /// Arguments follow the destination column order: open, close, high, low.
    pub fn new(
        symbol: impl Into<String>,
        date: NaiveDate,
        open: Decimal,
        close: Decimal,
        high: Decimal,
        low: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open,
            close,
            high,
            low,
            volume,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BatchError {
    #[error("record for {found} on {date} does not belong to a {expected} batch")]
    SymbolMismatch {
        expected: String,
        found: String,
        date: NaiveDate,
    },
}

/// The records of one run, all for the same symbol.
///
/// Handed to [`Db::replace_prices`](crate::db::Db::replace_prices) by value;
/// the loader owns it for the duration of the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBatch {
    symbol: String,
    records: Vec<PriceRecord>,
}

impl LoadBatch {
    pub fn new(symbol: impl Into<String>, records: Vec<PriceRecord>) -> Result<Self, BatchError> {
        let symbol = symbol.into();
        if let Some(stray) = records.iter().find(|r| r.symbol != symbol) {
            return Err(BatchError::SymbolMismatch {
                expected: symbol,
                found: stray.symbol.clone(),
                date: stray.date,
            });
        }
        Ok(Self { symbol, records })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
