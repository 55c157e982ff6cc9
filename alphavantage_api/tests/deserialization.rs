use alphavantage_api::types::{DailySeriesResponse, CLOSE_KEY, OPEN_KEY, VOLUME_KEY};
use alphavantage_api::Error;

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_daily_series_full() {
    let json = load_fixture("time_series_daily.json");
    let resp: DailySeriesResponse = serde_json::from_str(&json).unwrap();

    let meta = resp.meta_data.as_ref().unwrap();
    assert_eq!(meta.symbol.as_deref(), Some("NVDA"));
    assert_eq!(meta.last_refreshed.as_deref(), Some("2024-01-05"));
    assert_eq!(meta.time_zone.as_deref(), Some("US/Eastern"));
    assert!(resp.provider_message().is_none());

    let series = resp.into_series().unwrap();
    assert_eq!(series.len(), 4);
    let day = series["2024-01-02"].as_object().unwrap();
    assert_eq!(day[OPEN_KEY], "10.0");
    assert_eq!(day[CLOSE_KEY], "11.0");
    assert_eq!(day[VOLUME_KEY], "1000");
}

#[test]
fn series_keys_iterate_in_date_order() {
    let json = load_fixture("time_series_daily.json");
    let resp: DailySeriesResponse = serde_json::from_str(&json).unwrap();
    let keys: Vec<String> = resp.into_series().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec!["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
    );
}

#[test]
fn mixed_value_types_still_deserialize() {
    let json = load_fixture("time_series_mixed.json");
    let resp: DailySeriesResponse = serde_json::from_str(&json).unwrap();
    let series = resp.into_series().unwrap();
    assert_eq!(series.len(), 3);
    assert!(series["2024-01-02"][OPEN_KEY].is_number());
}

#[test]
fn error_message_is_surfaced_as_missing_series() {
    let json = load_fixture("time_series_error.json");
    let resp: DailySeriesResponse = serde_json::from_str(&json).unwrap();
    assert!(resp.provider_message().unwrap().starts_with("Invalid API call"));

    match resp.into_series() {
        Err(Error::SeriesMissing { key, detail }) => {
            assert_eq!(key, "Time Series (Daily)");
            assert!(detail.unwrap().contains("Invalid API call"));
        }
        other => panic!("expected SeriesMissing, got {:?}", other),
    }
}

#[test]
fn rate_limit_information_is_surfaced() {
    let json = load_fixture("time_series_rate_limited.json");
    let resp: DailySeriesResponse = serde_json::from_str(&json).unwrap();
    let err = resp.into_series().unwrap_err();
    assert!(err.to_string().contains("rate limit"));
}

#[test]
fn empty_document_has_no_message() {
    let resp: DailySeriesResponse = serde_json::from_str("{}").unwrap();
    let err = resp.into_series().unwrap_err();
    assert!(err.to_string().contains("no provider message"));
}
