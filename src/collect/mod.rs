// src/collect/mod.rs
//! Collection orchestration: per ticker, read the watermark, fan out to
//! every source adapter concurrently, merge the candidates and write them
//! through the store's insert-or-ignore dedup.

pub mod config;
pub mod sources;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::{Lazy, OnceCell};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::collect::config::ApiCredentials;
use crate::collect::types::{Candidate, CollectionError, Record, SourceAdapter};
use crate::store::Store;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

static HTTP: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent(concat!("ticker-sentiment/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("reqwest client")
});

/// Shared HTTP client for all adapters.
pub(crate) fn http_client() -> &'static reqwest::Client {
    &HTTP
}

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "collect_candidates_total",
            "Candidates returned by adapters after filtering."
        );
        describe_counter!("collect_stored_total", "Rows newly written to the store.");
        describe_counter!(
            "collect_duplicates_total",
            "Candidates skipped by the url uniqueness constraint."
        );
        describe_counter!(
            "collect_source_errors_total",
            "Adapter fetch/parse errors and timeouts."
        );
        describe_counter!(
            "collect_candidates_parsed_total",
            "Feed items parsed before filtering."
        );
        describe_histogram!("collect_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("collect_last_run_ts", "Unix ts of the last collection run.");
    });
}

/// Ticker relevance: case-insensitive substring match against title+summary.
/// Used by adapters whose upstream does not filter by symbol natively.
pub fn is_relevant(ticker: &str, title: &str, summary: &str) -> bool {
    let needle = ticker.to_lowercase();
    if needle.is_empty() {
        return false;
    }
    title.to_lowercase().contains(&needle) || summary.to_lowercase().contains(&needle)
}

/// Watermark gate: keep only candidates strictly newer than the watermark.
/// Canonical timestamps compare correctly as strings.
pub fn after_watermark(published_at: &str, watermark: Option<&str>) -> bool {
    match watermark {
        Some(wm) => published_at > wm,
        None => true,
    }
}

/// Per-source outcome of one run, reported instead of silently swallowed so
/// that a systematically failing source (revoked key, dead feed) stays
/// visible.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: &'static str,
    pub collected: usize,
    pub stored: usize,
    pub error: Option<String>,
}

/// Run totals. `duplicates` counts url-dedup skips only; store write
/// failures show up in the per-source `error`, not here.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub ticker: String,
    pub collected: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub sources: Vec<SourceReport>,
}

/// One store plus the adapters that feed it. Two instances exist in a
/// typical deployment: news and social.
pub struct Collector {
    store: Store,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    fetch_timeout: Duration,
}

impl Collector {
    pub fn new(store: Store, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            store,
            adapters,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// News-side wiring: syndication feeds, the REST news API, the financial
    /// data provider.
    pub fn news(store: Store, creds: &ApiCredentials, feeds: Vec<config::Feed>) -> Self {
        Self::new(
            store,
            vec![
                Arc::new(sources::FeedAdapter::new(feeds)),
                Arc::new(sources::NewsApiAdapter::new(creds.newsapi_key.clone())),
                Arc::new(sources::YahooNewsAdapter::new()),
            ],
        )
    }

    /// Social-side wiring: forum API, syndication surrogate, message stream.
    pub fn social(store: Store, creds: &ApiCredentials) -> Self {
        Self::new(
            store,
            vec![
                Arc::new(sources::RedditAdapter::new(creds)),
                Arc::new(sources::NitterAdapter::new()),
                Arc::new(sources::StocktwitsAdapter::new()),
            ],
        )
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// One collection run for a ticker. Idempotent: with no new upstream
    /// data, every candidate collapses into the uniqueness constraint and
    /// zero rows are stored.
    pub async fn collect(&self, ticker: &str) -> CollectionReport {
        ensure_metrics_described();

        let watermark = match self.store.latest_published_at(ticker) {
            Ok(wm) => wm,
            Err(e) => {
                tracing::warn!(error = %e, ticker, "watermark query failed; collecting unbounded");
                None
            }
        };
        tracing::info!(ticker, watermark = watermark.as_deref(), "collection run start");

        // Fan out: one task per adapter, each under its own timeout so one
        // stalled source cannot hold up the run.
        let mut set: JoinSet<(usize, Result<Vec<Candidate>, CollectionError>)> = JoinSet::new();
        for (idx, adapter) in self.adapters.iter().enumerate() {
            let adapter = Arc::clone(adapter);
            let ticker = ticker.to_string();
            let watermark = watermark.clone();
            let timeout = self.fetch_timeout;
            set.spawn(async move {
                let fetched =
                    tokio::time::timeout(timeout, adapter.fetch(&ticker, watermark.as_deref()))
                        .await
                        .unwrap_or(Err(CollectionError::Timeout(timeout)));
                (idx, fetched)
            });
        }

        let mut outcomes: Vec<Result<Vec<Candidate>, CollectionError>> =
            (0..self.adapters.len()).map(|_| Ok(Vec::new())).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, outcome)) => outcomes[idx] = outcome,
                Err(e) => tracing::warn!(error = %e, "adapter task panicked"),
            }
        }

        // Merge in fixed adapter order and write through the store.
        let mut report = CollectionReport {
            ticker: ticker.to_string(),
            collected: 0,
            stored: 0,
            duplicates: 0,
            sources: Vec::with_capacity(self.adapters.len()),
        };
        for (adapter, outcome) in self.adapters.iter().zip(outcomes) {
            let mut source = SourceReport {
                source: adapter.name(),
                collected: 0,
                stored: 0,
                error: None,
            };
            match outcome {
                Ok(candidates) => {
                    source.collected = candidates.len();
                    let mut write_failures = 0usize;
                    for candidate in candidates {
                        let record = Record::from_candidate(ticker, candidate);
                        match self.store.insert(&record) {
                            Ok(true) => source.stored += 1,
                            Ok(false) => report.duplicates += 1,
                            Err(e) => {
                                tracing::warn!(error = %e, source = adapter.name(), "store write failed");
                                write_failures += 1;
                            }
                        }
                    }
                    if write_failures > 0 {
                        counter!("collect_source_errors_total").increment(write_failures as u64);
                        source.error = Some(format!("{write_failures} store write(s) failed"));
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, source = adapter.name(), "source failed");
                    counter!("collect_source_errors_total").increment(1);
                    source.error = Some(e.to_string());
                }
            }
            report.collected += source.collected;
            report.stored += source.stored;
            report.sources.push(source);
        }

        counter!("collect_candidates_total").increment(report.collected as u64);
        counter!("collect_stored_total").increment(report.stored as u64);
        counter!("collect_duplicates_total").increment(report.duplicates as u64);
        gauge!("collect_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        tracing::info!(
            ticker,
            collected = report.collected,
            stored = report.stored,
            duplicates = report.duplicates,
            "collection run done"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_is_case_insensitive_substring() {
        assert!(is_relevant("AAPL", "AAPL hits record high", ""));
        assert!(is_relevant("aapl", "", "Why $AAPL keeps climbing"));
        assert!(!is_relevant("AAPL", "Tesla delivers", "record quarter"));
        assert!(!is_relevant("", "anything", "anything"));
    }

    #[test]
    fn watermark_gate_is_strict() {
        let wm = Some("2025-08-01 10:00:00");
        assert!(!after_watermark("2025-08-01 09:59:59", wm));
        assert!(!after_watermark("2025-08-01 10:00:00", wm));
        assert!(after_watermark("2025-08-01 10:00:01", wm));
        assert!(after_watermark("2000-01-01 00:00:00", None));
    }
}
