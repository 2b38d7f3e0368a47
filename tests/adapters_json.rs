// tests/adapters_json.rs
//! Fixture-driven parsing tests for the JSON-speaking adapters.

use std::fs;
use ticker_sentiment::collect::sources::{
    NewsApiAdapter, RedditAdapter, StocktwitsAdapter, YahooNewsAdapter,
};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|_| panic!("missing tests/fixtures/{name}"))
}

// --- NewsAPI ---

#[test]
fn newsapi_keeps_only_ticker_relevant_articles() {
    let items = NewsApiAdapter::parse_fixture(&fixture("newsapi.json"), "AAPL", None).unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().any(|c| c.source == "NewsAPI (TechWire)"));
    // article with a null source object falls back to the provider name
    assert!(items.iter().any(|c| c.source == "NewsAPI (NewsAPI)"));
    assert!(items
        .iter()
        .any(|c| c.published_at == "2025-08-05 16:45:12"));
}

#[test]
fn newsapi_watermark_drops_old_articles() {
    let items = NewsApiAdapter::parse_fixture(
        &fixture("newsapi.json"),
        "AAPL",
        Some("2025-08-01 00:00:00"),
    )
    .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].url.as_deref(), Some("https://techwire.example/aapl-beats"));
}

#[test]
fn newsapi_garbage_body_is_a_parse_error() {
    assert!(NewsApiAdapter::parse_fixture("<html>rate limited</html>", "AAPL", None).is_err());
}

// --- Yahoo Finance ---

#[test]
fn yahoo_extracts_urls_from_nested_locations() {
    let items = YahooNewsAdapter::parse_fixture(&fixture("yahoo_news.json"), "AAPL", None).unwrap();
    assert_eq!(items.len(), 3, "the titleless item must be skipped");

    let bundle = items.iter().find(|c| c.title.contains("services bundle")).unwrap();
    assert_eq!(
        bundle.url.as_deref(),
        Some("https://finance.yahoo.example/aapl-services"),
        "clickThroughUrl wins over canonicalUrl"
    );

    let targets = items.iter().find(|c| c.title.contains("trim Apple targets")).unwrap();
    assert_eq!(targets.url.as_deref(), Some("https://news.example/aapl-targets"));

    let legacy = items.iter().find(|c| c.title.contains("legacy shape")).unwrap();
    assert_eq!(legacy.url.as_deref(), Some("https://news.example/legacy-item"));
    assert!(items.iter().all(|c| c.source == "Yahoo Finance (AAPL)"));
}

#[test]
fn yahoo_watermark_applies_to_dated_items() {
    let items = YahooNewsAdapter::parse_fixture(
        &fixture("yahoo_news.json"),
        "AAPL",
        Some("2025-08-05 00:00:00"),
    )
    .unwrap();
    // The Aug 4 item is stale; the undated legacy item defaults to "now"
    // and stays.
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|c| !c.title.contains("trim Apple targets")));
}

// --- Reddit ---

#[test]
fn reddit_filters_relevance_and_builds_permalinks() {
    let items =
        RedditAdapter::parse_fixture(&fixture("reddit_listing.json"), "AAPL", None).unwrap();
    assert_eq!(items.len(), 2, "the broker question has no ticker mention");

    let thread = items.iter().find(|c| c.title.contains("megathread")).unwrap();
    assert_eq!(
        thread.url.as_deref(),
        Some("https://reddit.com/r/stocks/comments/abc123/aapl_earnings_megathread/")
    );
    assert_eq!(thread.source, "Reddit (r/stocks)");
    assert_eq!(thread.published_at, "2025-08-05 15:30:00");
}

#[test]
fn reddit_watermark_drops_old_posts() {
    let items = RedditAdapter::parse_fixture(
        &fixture("reddit_listing.json"),
        "AAPL",
        Some("2025-08-01 00:00:00"),
    )
    .unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].title.contains("megathread"));
}

// --- Stocktwits ---

#[test]
fn stocktwits_stream_parses_and_skips_empty_bodies() {
    let items =
        StocktwitsAdapter::parse_fixture(&fixture("stocktwits_stream.json"), None).unwrap();
    assert_eq!(items.len(), 3);
    let first = &items[0];
    assert_eq!(
        first.url.as_deref(),
        Some("https://stocktwits.com/bull_rider/message/600100001")
    );
    assert_eq!(first.published_at, "2025-08-05 17:20:11");
    assert!(items.iter().all(|c| c.source == "Stocktwits"));
}

#[test]
fn stocktwits_watermark_drops_old_messages() {
    let items = StocktwitsAdapter::parse_fixture(
        &fixture("stocktwits_stream.json"),
        Some("2025-08-01 00:00:00"),
    )
    .unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn stocktwits_scrape_fallback_pulls_bodies_from_html() {
    let items = StocktwitsAdapter::scrape_fixture(&fixture("stocktwits_page.html"));
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|c| c.source == "Stocktwits (scrape)"));
    assert!(items.iter().all(|c| c.url.is_none()));
    assert!(items[1].title.contains("guidance looked fine"));
}
