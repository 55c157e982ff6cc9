//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or client construction).
    #[error("Request failed")]
    RequestFailed,
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The API answered with a body that is not the expected JSON document.
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
    /// The response parsed but the expected time series is absent. Alpha Vantage
    /// reports bad symbols, bad keys and rate limits this way, with HTTP 200.
    #[error("Response has no \"{key}\" series ({})", .detail.as_deref().unwrap_or("no provider message"))]
    SeriesMissing { key: String, detail: Option<String> },
}
