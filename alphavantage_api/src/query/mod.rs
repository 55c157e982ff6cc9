mod common;
pub use self::common::{OutputSize, Query};

mod time_series;
pub use self::time_series::TimeSeriesQuery;
