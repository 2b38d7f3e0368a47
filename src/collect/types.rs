// src/collect/types.rs
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// What an adapter emits: a record minus the ticker, with `published_at`
/// already normalized to the canonical sortable form at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub content: Option<String>,
    pub url: Option<String>,
    pub source: String,
    pub published_at: String,
}

/// The stored shape. `url` is the dedup key and is always non-empty: when a
/// source has no canonical link we substitute a synthetic key so unrelated
/// link-less items cannot collapse into one row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub ticker: String,
    pub title: String,
    pub content: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: String,
}

impl Record {
    pub fn from_candidate(ticker: &str, c: Candidate) -> Self {
        let url = match c.url.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => synthetic_url(&c.title, &c.source, &c.published_at),
        };
        Self {
            ticker: ticker.to_string(),
            title: c.title,
            content: c.content,
            url,
            source: c.source,
            published_at: c.published_at,
        }
    }
}

fn synthetic_url(title: &str, source: &str, published_at: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(source.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(published_at.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(22);
    out.push_str("synthetic:");
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("http request failed: {0}")]
    Http(String),
    #[error("response parse failed: {0}")]
    Parse(String),
    #[error("credentials missing or rejected: {0}")]
    Credentials(String),
    #[error("fetch timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<reqwest::Error> for CollectionError {
    fn from(e: reqwest::Error) -> Self {
        CollectionError::Http(e.to_string())
    }
}

/// One external source. Implementations must not panic on bad upstream data;
/// per-item problems skip the item, transport problems surface as `Err` and
/// the orchestrator moves on to the next source.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(
        &self,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: Option<&str>) -> Candidate {
        Candidate {
            title: "Apple beats estimates".into(),
            content: None,
            url: url.map(String::from),
            source: "Test".into(),
            published_at: "2025-08-01 10:00:00".into(),
        }
    }

    #[test]
    fn missing_url_gets_synthetic_key() {
        let r = Record::from_candidate("AAPL", candidate(None));
        assert!(r.url.starts_with("synthetic:"));
        assert_eq!(r.url.len(), "synthetic:".len() + 12);
    }

    #[test]
    fn empty_url_gets_synthetic_key() {
        let r = Record::from_candidate("AAPL", candidate(Some("  ")));
        assert!(r.url.starts_with("synthetic:"));
    }

    #[test]
    fn synthetic_keys_differ_across_distinct_items() {
        let a = Record::from_candidate("AAPL", candidate(None));
        let mut other = candidate(None);
        other.title = "Apple misses estimates".into();
        let b = Record::from_candidate("AAPL", other);
        assert_ne!(a.url, b.url);
    }

    #[test]
    fn real_url_is_kept_verbatim() {
        let r = Record::from_candidate("AAPL", candidate(Some("https://x/1")));
        assert_eq!(r.url, "https://x/1");
    }
}
