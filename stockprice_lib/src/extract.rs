//! Extract stage: fetch the daily series and keep the trailing window.

use alphavantage_api::{Client, OutputSize, TimeSeriesQuery};
use chrono::{Days, NaiveDate};
use serde_json::{Map, Value};

/// Calendar date format of the provider's series keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One provider entry: the literal date key and its field object.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDailyQuote {
    pub date: String,
    pub fields: Map<String, Value>,
}

impl RawDailyQuote {
    pub fn new(date: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            date: date.into(),
            fields,
        }
    }
}

/// Parses a series key as a `YYYY-MM-DD` date. Used by both stages, so a key
/// is either dated in both or malformed in both.
pub(crate) fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_FORMAT).ok()
}

/// First calendar day inside a window of `window_days` ending `today`.
pub fn cutoff_date(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Keeps entries dated on or after `cutoff`.
///
/// There is no upper bound, so future-dated entries pass. Keys that are not
/// `YYYY-MM-DD` dates also pass; the transformer rejects them individually.
pub fn filter_window(series: Map<String, Value>, cutoff: NaiveDate) -> Vec<RawDailyQuote> {
    series
        .into_iter()
        .filter(|(date, _)| match parse_date_key(date) {
            Some(day) => day >= cutoff,
            None => {
                tracing::debug!(date = %date, "unparseable date key passed through");
                true
            }
        })
        .map(|(date, value)| {
            let fields = match value {
                Value::Object(fields) => fields,
                _ => Map::new(),
            };
            RawDailyQuote { date, fields }
        })
        .collect()
}

/// Fetches the daily series for `symbol` and returns the quotes inside the
/// trailing `window_days` window ending `today`.
///
/// Fails on any transport or status error and when the response carries no
/// daily series. Performs exactly one request and never retries.
pub async fn extract(
    client: &Client,
    symbol: &str,
    output_size: OutputSize,
    window_days: u32,
    today: NaiveDate,
) -> Result<Vec<RawDailyQuote>, alphavantage_api::Error> {
    let query = TimeSeriesQuery::daily(symbol).with_output_size(output_size);
    let series = client.get_daily_series(&query).await?.into_series()?;
    let total = series.len();
    let cutoff = cutoff_date(today, window_days);
    let quotes = filter_window(series, cutoff);
    tracing::info!(
        symbol,
        total,
        kept = quotes.len(),
        cutoff = %cutoff,
        "extracted daily quotes"
    );
    Ok(quotes)
}
