//! HTTP client for the Alpha Vantage query API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::{Query, TimeSeriesQuery},
    types::DailySeriesResponse,
    Error,
};

/// Request timeout for provider calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// HTTP client for the Alpha Vantage API.
///
/// Holds one `reqwest::Client` with a bounded timeout. The API key is sent
/// as the `apikey` query parameter and is never written to logs.
pub struct Client {
    http: reqwest::Client,
    /// Base URL for the API. Defaults to `https://www.alphavantage.co`.
    base_api_url: String,
    api_key: String,
}

impl Client {
    /// Creates a new client pointing at the production API.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    /// Creates a new client with a custom base URL and request deadline.
    pub fn with_timeout(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stockprice-etl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            base_api_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn get_url(&self, path: &str, query: &impl Query) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })?;
        let mut url = query.add_to_url(&url);
        url.query_pairs_mut().append_pair("apikey", &self.api_key);
        Ok(url)
    }

    async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Query,
    {
        let url = self.get_url(path, query)?;
        let resp = self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                // reqwest includes the URL in its Display output; strip it to keep the key out.
                tracing::error!("Failed to get {}: {}", path, e.without_url());
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e.without_url());
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::MalformedBody(e.to_string())
        })
    }

    /// Fetches the daily OHLCV series described by `query`.
    ///
    /// A successful return does not guarantee the series is present; use
    /// [`DailySeriesResponse::into_series`] to insist on it.
    pub async fn get_daily_series(
        &self,
        query: &TimeSeriesQuery,
    ) -> Result<DailySeriesResponse, Error> {
        tracing::debug!(
            symbol = query.symbol(),
            output_size = %query.output_size(),
            "requesting daily series"
        );
        self.get::<DailySeriesResponse, TimeSeriesQuery>("/query", query)
            .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
