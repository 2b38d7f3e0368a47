// tests/store_dedup.rs
use ticker_sentiment::{Record, Store};

fn record(title: &str, url: &str, published_at: &str) -> Record {
    Record {
        ticker: "AAPL".into(),
        title: title.into(),
        content: Some("body".into()),
        url: url.into(),
        source: "Test".into(),
        published_at: published_at.into(),
    }
}

#[test]
fn second_insert_with_same_url_is_ignored() {
    let store = Store::open_news_in_memory().unwrap();
    let r = record("hello", "https://x/1", "2025-08-01 10:00:00");
    assert!(store.insert(&r).unwrap());
    assert!(!store.insert(&r).unwrap());
    assert_eq!(store.count("AAPL").unwrap(), 1);
}

#[test]
fn store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("news.db");

    {
        let store = Store::open_news(&path).unwrap();
        assert!(store
            .insert(&record("persisted", "https://x/1", "2025-08-01 10:00:00"))
            .unwrap());
    }

    // Re-init is idempotent and existing rows still dedup.
    let store = Store::open_news(&path).unwrap();
    assert!(!store
        .insert(&record("persisted", "https://x/1", "2025-08-01 10:00:00"))
        .unwrap());
    assert_eq!(
        store.latest_published_at("AAPL").unwrap().as_deref(),
        Some("2025-08-01 10:00:00")
    );
}

#[test]
fn news_and_social_tables_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("both.db");
    let news = Store::open_news(&path).unwrap();
    let social = Store::open_social(&path).unwrap();

    assert!(news
        .insert(&record("article", "https://x/1", "2025-08-01 10:00:00"))
        .unwrap());
    // Same url in the other table is a distinct row space.
    assert!(social
        .insert(&record("post", "https://x/1", "2025-08-02 10:00:00"))
        .unwrap());

    assert_eq!(news.count("AAPL").unwrap(), 1);
    assert_eq!(social.count("AAPL").unwrap(), 1);
    assert_eq!(
        social.latest_published_at("AAPL").unwrap().as_deref(),
        Some("2025-08-02 10:00:00")
    );
}

#[test]
fn watermark_never_moves_backwards_on_insert() {
    let store = Store::open_news_in_memory().unwrap();
    store.insert(&record("new", "https://x/1", "2025-08-10 00:00:00")).unwrap();
    let before = store.latest_published_at("AAPL").unwrap();

    // A late-arriving older record may be stored, but the watermark holds.
    store.insert(&record("late old", "https://x/2", "2025-08-01 00:00:00")).unwrap();
    let after = store.latest_published_at("AAPL").unwrap();
    assert!(after >= before);
    assert_eq!(after.as_deref(), Some("2025-08-10 00:00:00"));
}
