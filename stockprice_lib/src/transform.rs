//! Transform stage: provider quotes to typed [`PriceRecord`]s.
//!
//! Conversion is per quote. A quote that fails to convert is dropped with a
//! warning and the rest of the batch carries on.

use std::borrow::Cow;
use std::str::FromStr;

use alphavantage_api::types::{CLOSE_KEY, HIGH_KEY, LOW_KEY, OPEN_KEY, VOLUME_KEY};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::extract::{parse_date_key, RawDailyQuote};
use crate::record::PriceRecord;

/// Decimal places of the destination's `DECIMAL(12,4)` columns.
pub const PRICE_SCALE: u32 = 4;

/// Exclusive upper bound of a `DECIMAL(12,4)` value (8 integer digits).
const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("missing field \"{0}\"")]
    MissingField(&'static str),
    #[error("field \"{field}\" is not a decimal number: '{value}'")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("field \"{field}\" is negative: {value}")]
    Negative { field: &'static str, value: Decimal },
    #[error("field \"{field}\" does not fit DECIMAL(12,4): {value}")]
    OutOfRange { field: &'static str, value: Decimal },
    #[error("volume is not a non-negative 64-bit integer: '{0}'")]
    InvalidVolume(String),
}

fn field_text<'a>(
    fields: &'a Map<String, Value>,
    key: &'static str,
) -> Result<Cow<'a, str>, ConversionError> {
    match fields.get(key) {
        None | Some(Value::Null) => Err(ConversionError::MissingField(key)),
        Some(Value::String(text)) => Ok(Cow::Borrowed(text.trim())),
        Some(other) => Ok(Cow::Owned(other.to_string())),
    }
}

fn parse_price(fields: &Map<String, Value>, key: &'static str) -> Result<Decimal, ConversionError> {
    let text = field_text(fields, key)?;
    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ConversionError::InvalidDecimal {
            field: key,
            value: text.to_string(),
        })?;
    if value < Decimal::ZERO {
        return Err(ConversionError::Negative { field: key, value });
    }
    let value = value.round_dp(PRICE_SCALE);
    if value >= PRICE_LIMIT {
        return Err(ConversionError::OutOfRange { field: key, value });
    }
    Ok(value)
}

fn parse_volume(fields: &Map<String, Value>) -> Result<u64, ConversionError> {
    let text = field_text(fields, VOLUME_KEY)?;
    text.parse::<u64>()
        .ok()
        .filter(|v| i64::try_from(*v).is_ok())
        .ok_or_else(|| ConversionError::InvalidVolume(text.to_string()))
}

/// Converts one quote into a record for `symbol`.
pub fn transform_quote(symbol: &str, quote: &RawDailyQuote) -> Result<PriceRecord, ConversionError> {
    let date = parse_date_key(&quote.date)
        .ok_or_else(|| ConversionError::InvalidDate(quote.date.clone()))?;
    let fields = &quote.fields;
    Ok(PriceRecord {
        symbol: symbol.to_string(),
        date,
        open: parse_price(fields, OPEN_KEY)?,
        close: parse_price(fields, CLOSE_KEY)?,
        high: parse_price(fields, HIGH_KEY)?,
        low: parse_price(fields, LOW_KEY)?,
        volume: parse_volume(fields)?,
    })
}

/// Converts every quote that converts cleanly; the others are logged and dropped.
///
/// Duplicate dates are not collapsed here. The destination's primary key
/// rejects them at load time.
pub fn transform(symbol: &str, quotes: &[RawDailyQuote]) -> Vec<PriceRecord> {
    let mut records = Vec::with_capacity(quotes.len());
    for quote in quotes {
        match transform_quote(symbol, quote) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(symbol, date = %quote.date, reason = %err, "skipping quote");
            }
        }
    }
    let skipped = quotes.len() - records.len();
    tracing::info!(symbol, converted = records.len(), skipped, "transformed quotes");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn quote(date: &str, fields: Value) -> RawDailyQuote {
        match fields {
            Value::Object(map) => RawDailyQuote::new(date, map),
            _ => panic!("fields must be an object"),
        }
    }

    fn good(date: &str) -> RawDailyQuote {
        quote(
            date,
            json!({
                "1. open": "10.0",
                "2. high": "12.0",
                "3. low": "9.5",
                "4. close": "11.0",
                "5. volume": "1000"
            }),
        )
    }

    #[test]
    fn converts_reference_quote() {
        let record = transform_quote("NVDA", &good("2024-01-02")).unwrap();
        assert_eq!(
            record,
            PriceRecord::new(
                "NVDA",
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                dec!(10.0),
                dec!(11.0),
                dec!(12.0),
                dec!(9.5),
                1000,
            )
        );
    }

    #[test]
    fn rounds_to_four_places() {
        let q = quote(
            "2024-01-02",
            json!({
                "1. open": "10.123456",
                "2. high": "12.00005",
                "3. low": "9.5",
                "4. close": "11.0",
                "5. volume": "1"
            }),
        );
        let record = transform_quote("NVDA", &q).unwrap();
        assert_eq!(record.open, dec!(10.1235));
        assert_eq!(record.high.scale(), 4);
    }

    #[test]
    fn accepts_json_numbers() {
        let q = quote(
            "2024-01-02",
            json!({
                "1. open": 10.0,
                "2. high": 12,
                "3. low": "9.5",
                "4. close": "11.0",
                "5. volume": 1000
            }),
        );
        let record = transform_quote("NVDA", &q).unwrap();
        assert_eq!(record.open, dec!(10));
        assert_eq!(record.high, dec!(12));
        assert_eq!(record.volume, 1000);
    }

    #[test]
    fn non_numeric_volume_is_rejected() {
        let mut q = good("2024-01-02");
        q.fields.insert("5. volume".to_string(), json!("abc"));
        assert_eq!(
            transform_quote("NVDA", &q),
            Err(ConversionError::InvalidVolume("abc".to_string()))
        );
    }

    #[test]
    fn fractional_and_negative_volume_are_rejected() {
        for bad in ["1000.5", "-1", "99999999999999999999"] {
            let mut q = good("2024-01-02");
            q.fields.insert("5. volume".to_string(), json!(bad));
            assert!(
                matches!(transform_quote("NVDA", &q), Err(ConversionError::InvalidVolume(_))),
                "volume {}",
                bad
            );
        }
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut q = good("2024-01-02");
        q.fields.remove("3. low");
        assert_eq!(
            transform_quote("NVDA", &q),
            Err(ConversionError::MissingField("3. low"))
        );
    }

    #[test]
    fn null_field_counts_as_missing() {
        let mut q = good("2024-01-02");
        q.fields.insert("4. close".to_string(), Value::Null);
        assert_eq!(
            transform_quote("NVDA", &q),
            Err(ConversionError::MissingField("4. close"))
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        for bad in ["2024-13-01", "01/02/2024", "garbage"] {
            assert_eq!(
                transform_quote("NVDA", &good(bad)),
                Err(ConversionError::InvalidDate(bad.to_string()))
            );
        }
    }

    #[test]
    fn padded_date_key_is_rejected() {
        let bad = "2024-01-02 ";
        assert_eq!(
            transform_quote("NVDA", &good(bad)),
            Err(ConversionError::InvalidDate(bad.to_string()))
        );
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        for bad in ["ten", "NaN", "inf", ""] {
            let mut q = good("2024-01-02");
            q.fields.insert("1. open".to_string(), json!(bad));
            assert!(
                matches!(
                    transform_quote("NVDA", &q),
                    Err(ConversionError::InvalidDecimal { field: "1. open", .. })
                ),
                "open {:?}",
                bad
            );
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut q = good("2024-01-02");
        q.fields.insert("2. high".to_string(), json!("-0.01"));
        assert!(matches!(
            transform_quote("NVDA", &q),
            Err(ConversionError::Negative { field: "2. high", .. })
        ));
    }

    #[test]
    fn price_beyond_column_precision_is_rejected() {
        let mut q = good("2024-01-02");
        q.fields.insert("4. close".to_string(), json!("100000000"));
        assert!(matches!(
            transform_quote("NVDA", &q),
            Err(ConversionError::OutOfRange { field: "4. close", .. })
        ));

        q.fields.insert("4. close".to_string(), json!("99999999.9999"));
        assert!(transform_quote("NVDA", &q).is_ok());
    }

    #[test]
    fn bad_quote_does_not_abort_batch() {
        let mut bad = good("2024-01-03");
        bad.fields.insert("5. volume".to_string(), json!("abc"));
        let quotes = vec![good("2024-01-02"), bad, good("2024-01-04")];

        let records = transform("NVDA", &quotes);
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-04"]);
    }

    #[test]
    fn duplicates_pass_through() {
        let quotes = vec![good("2024-01-02"), good("2024-01-02")];
        assert_eq!(transform("NVDA", &quotes).len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(transform("NVDA", &[]).is_empty());
    }
}
