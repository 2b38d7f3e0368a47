// src/normalize.rs
//! Date and text normalization shared by all source adapters.
//!
//! Every `published_at` that leaves an adapter is in the canonical,
//! lexicographically sortable form `YYYY-MM-DD HH:MM:SS` (UTC), so the
//! store's watermark query is a plain string comparison.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in canonical form.
pub fn canonical_now() -> String {
    Utc::now().format(CANONICAL_FORMAT).to_string()
}

/// Canonical form of a unix timestamp (seconds). Out-of-range values fall
/// back to "now".
pub fn canonical_from_unix(secs: i64) -> String {
    match Utc.timestamp_opt(secs, 0) {
        chrono::offset::LocalResult::Single(dt) => dt.format(CANONICAL_FORMAT).to_string(),
        _ => canonical_now(),
    }
}

/// Normalize a raw source timestamp into canonical form. Total: any input,
/// including `None`, yields a valid canonical string ("now" on parse failure).
///
/// Dispatch is a deliberate heuristic over the formats the sources actually
/// emit, not a general date parser:
/// - `GMT`/`UTC` marker: RFC-822 feed date ("Wed, 05 Jun 2024 11:34:00 GMT")
/// - literal `T`: ISO-8601 ("2025-08-31T12:27:47Z", "2025-09-01T12:00:00+00:00")
/// - anything else: unparseable, use "now"
pub fn normalize_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return canonical_now();
    };

    if raw.contains("GMT") || raw.contains("UTC") {
        parse_rfc2822(raw).unwrap_or_else(canonical_now)
    } else if raw.contains('T') {
        parse_iso8601(raw).unwrap_or_else(canonical_now)
    } else {
        canonical_now()
    }
}

fn parse_rfc2822(raw: &str) -> Option<String> {
    // Some feeds write "UTC" where RFC-822 wants "GMT".
    let cleaned = raw.replace("UTC", "GMT");
    DateTime::parse_from_rfc2822(&cleaned)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).format(CANONICAL_FORMAT).to_string())
}

fn parse_iso8601(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).format(CANONICAL_FORMAT).to_string());
    }
    // Offset-less ISO timestamps are treated as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.format(CANONICAL_FORMAT).to_string())
}

/// Normalize free text: decode entities, strip tags, fold curly quotes,
/// collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 2000 chars
    if out.chars().count() > 2000 {
        out = out.chars().take(2000).collect();
    }

    out
}
