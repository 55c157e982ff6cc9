use alphavantage_api::{OutputSize, Query, TimeSeriesQuery};
use url::Url;

fn base_url() -> Url {
    Url::parse("https://www.alphavantage.co/query").unwrap()
}

fn pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[test]
fn daily_query_defaults_to_compact() {
    let url = TimeSeriesQuery::daily("NVDA").add_to_url(&base_url());
    assert_eq!(
        pairs(&url),
        vec![
            ("function".to_string(), "TIME_SERIES_DAILY".to_string()),
            ("symbol".to_string(), "NVDA".to_string()),
            ("outputsize".to_string(), "compact".to_string()),
        ]
    );
}

#[test]
fn daily_query_full_output() {
    let query = TimeSeriesQuery::daily("IBM").with_output_size(OutputSize::Full);
    assert_eq!(query.output_size(), OutputSize::Full);
    let url = query.add_to_url(&base_url());
    assert!(url.as_str().ends_with("outputsize=full"));
}

#[test]
fn symbol_is_percent_encoded() {
    let url = TimeSeriesQuery::daily("BRK.B&x=1").add_to_url(&base_url());
    assert!(url.as_str().contains("symbol=BRK.B%26x%3D1"));
}

#[test]
fn output_size_parses_case_insensitively() {
    assert_eq!("FULL".parse::<OutputSize>().unwrap(), OutputSize::Full);
    assert_eq!(" compact ".parse::<OutputSize>().unwrap(), OutputSize::Compact);
    assert!("weekly".parse::<OutputSize>().is_err());
}

#[test]
fn output_size_display_round_trips() {
    for size in [OutputSize::Compact, OutputSize::Full] {
        assert_eq!(size.to_string().parse::<OutputSize>().unwrap(), size);
    }
}
