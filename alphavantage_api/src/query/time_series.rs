//! Query builder for the daily time series endpoint.

use url::Url;

use crate::query::{OutputSize, Query};

/// Value of the `function` parameter for unadjusted daily bars.
pub const DAILY_FUNCTION: &str = "TIME_SERIES_DAILY";

/// Builder for a `TIME_SERIES_DAILY` request.
///
/// ```
/// use alphavantage_api::{OutputSize, TimeSeriesQuery};
///
/// let query = TimeSeriesQuery::daily("NVDA").with_output_size(OutputSize::Full);
/// assert_eq!(query.symbol(), "NVDA");
/// ```
#[derive(Clone, Debug)]
pub struct TimeSeriesQuery {
    symbol: String,
    output_size: OutputSize,
}

impl TimeSeriesQuery {
    /// Daily bars for `symbol` with the default (compact) output size.
    pub fn daily(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            output_size: OutputSize::default(),
        }
    }

    pub fn with_output_size(mut self, output_size: OutputSize) -> Self {
        self.output_size = output_size;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn output_size(&self) -> OutputSize {
        self.output_size
    }
}

impl Query for TimeSeriesQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("function", DAILY_FUNCTION)
            .append_pair("symbol", &self.symbol)
            .append_pair("outputsize", self.output_size.as_str());
        url
    }
}
