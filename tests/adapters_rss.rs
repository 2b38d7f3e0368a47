// tests/adapters_rss.rs
use std::fs;
use ticker_sentiment::collect::sources::FeedAdapter;

fn fixture() -> String {
    fs::read_to_string("tests/fixtures/bloomberg_rss.xml")
        .expect("missing tests/fixtures/bloomberg_rss.xml")
}

#[test]
fn relevant_items_parse_with_canonical_dates() {
    let items = FeedAdapter::parse_fixture(&fixture(), "Bloomberg Markets", "AAPL", None)
        .expect("rss parse ok");

    // 4 items in the feed, one is about oil, 3 mention AAPL.
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|c| c.source == "RSS (Bloomberg Markets)"));
    assert!(items
        .iter()
        .any(|c| c.published_at == "2025-08-05 14:30:00"));
    // entity-decoded, tag-free text
    assert!(items
        .iter()
        .any(|c| c.content.as_deref() == Some("Apple (AAPL) shares climbed after strong quarterly results.")));
}

#[test]
fn irrelevant_items_are_dropped() {
    let items =
        FeedAdapter::parse_fixture(&fixture(), "Bloomberg Markets", "AAPL", None).unwrap();
    assert!(items.iter().all(|c| {
        let hay = format!(
            "{} {}",
            c.title.to_lowercase(),
            c.content.clone().unwrap_or_default().to_lowercase()
        );
        hay.contains("aapl")
    }));
}

#[test]
fn watermark_filters_stale_items() {
    let wm = Some("2025-08-01 00:00:00");
    let items = FeedAdapter::parse_fixture(&fixture(), "Bloomberg Markets", "AAPL", wm).unwrap();
    assert_eq!(items.len(), 2, "the July item must be gone");
    assert!(items.iter().all(|c| c.published_at.as_str() > wm.unwrap()));
}

#[test]
fn missing_link_yields_urlless_candidate() {
    let items =
        FeedAdapter::parse_fixture(&fixture(), "Bloomberg Markets", "AAPL", None).unwrap();
    let linkless = items
        .iter()
        .find(|c| c.title.contains("supplier note"))
        .expect("linkless item kept");
    assert!(linkless.url.is_none());
}

#[test]
fn malformed_xml_is_a_parse_error_not_a_panic() {
    let err = FeedAdapter::parse_fixture("<rss><channel><item>", "X", "AAPL", None);
    assert!(err.is_err());
}
