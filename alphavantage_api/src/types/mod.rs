mod time_series;
pub use self::time_series::{
    DailySeriesResponse, MetaData, CLOSE_KEY, DAILY_SERIES_KEY, HIGH_KEY, LOW_KEY, OPEN_KEY,
    VOLUME_KEY,
};
