// tests/normalize_dates.rs
use chrono::NaiveDateTime;
use ticker_sentiment::normalize::{canonical_from_unix, normalize_date, CANONICAL_FORMAT};

fn assert_canonical(s: &str) {
    assert!(
        NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT).is_ok(),
        "not canonical: {s}"
    );
}

#[test]
fn normalization_is_total() {
    let inputs = [
        Some("Wed, 05 Jun 2024 11:34:00 GMT"),
        Some("Wed, 05 Jun 2024 11:34:00 UTC"),
        Some("2025-08-31T12:27:47Z"),
        Some("2025-09-01T12:00:00+00:00"),
        Some("2025-09-01T12:00:00"),
        Some(""),
        Some("yesterday-ish"),
        Some("2025/08/31"),
        None,
    ];
    for raw in inputs {
        assert_canonical(&normalize_date(raw));
    }
}

#[test]
fn iso_round_trips_to_same_instant() {
    assert_eq!(normalize_date(Some("2025-08-31T12:27:47Z")), "2025-08-31 12:27:47");
    assert_eq!(
        normalize_date(Some("2025-09-01T12:00:00+00:00")),
        "2025-09-01 12:00:00"
    );
    // offset folded into UTC
    assert_eq!(
        normalize_date(Some("2025-09-01T14:00:00+02:00")),
        "2025-09-01 12:00:00"
    );
}

#[test]
fn rss_dates_are_sortable_against_iso_dates() {
    let rss = normalize_date(Some("Tue, 05 Aug 2025 14:30:00 GMT"));
    let iso = normalize_date(Some("2025-08-05T16:45:12Z"));
    assert!(rss < iso, "canonical strings must sort chronologically");
}

#[test]
fn unix_conversion_matches_known_instant() {
    assert_eq!(canonical_from_unix(1_754_407_800), "2025-08-05 15:30:00");
}
