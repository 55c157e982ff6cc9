use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// Top-level key holding the date-keyed daily bars.
pub const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

pub const OPEN_KEY: &str = "1. open";
pub const HIGH_KEY: &str = "2. high";
pub const LOW_KEY: &str = "3. low";
pub const CLOSE_KEY: &str = "4. close";
pub const VOLUME_KEY: &str = "5. volume";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MetaData {
    #[serde(rename = "1. Information")]
    pub information: Option<String>,
    #[serde(rename = "2. Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "3. Last Refreshed")]
    pub last_refreshed: Option<String>,
    #[serde(rename = "4. Output Size")]
    pub output_size: Option<String>,
    #[serde(rename = "5. Time Zone")]
    pub time_zone: Option<String>,
}

/// Response document of `function=TIME_SERIES_DAILY`.
///
/// The series is kept as raw JSON: each date maps to an object of
/// string-encoded OHLCV fields. Typing them is the caller's job, so a single
/// malformed day does not fail the whole document.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DailySeriesResponse {
    #[serde(rename = "Meta Data")]
    pub meta_data: Option<MetaData>,
    #[serde(rename = "Time Series (Daily)")]
    pub time_series: Option<Map<String, Value>>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

impl DailySeriesResponse {
    /// The provider's explanation when it declined to return data.
    pub fn provider_message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.note.as_deref())
            .or(self.information.as_deref())
    }

    /// Takes the date-keyed series, failing when the provider omitted it.
    pub fn into_series(self) -> Result<Map<String, Value>, Error> {
        let detail = self.provider_message().map(str::to_string);
        self.time_series.ok_or_else(|| Error::SeriesMissing {
            key: DAILY_SERIES_KEY.to_string(),
            detail,
        })
    }
}
