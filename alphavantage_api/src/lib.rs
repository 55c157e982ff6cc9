mod client;
mod errors;
mod query;
pub mod types;
pub use self::client::{Client, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
pub use self::errors::Error;
pub use self::query::{OutputSize, Query, TimeSeriesQuery};
