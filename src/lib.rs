// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod collect;
pub mod normalize;
pub mod sentiment;
pub mod store;
pub mod summary;

// ---- Re-exports for stable public API ----
pub use crate::collect::types::{Candidate, CollectionError, Record, SourceAdapter};
pub use crate::collect::{CollectionReport, Collector, SourceReport};
pub use crate::sentiment::{LexiconScorer, SentimentScorer};
pub use crate::store::Store;
pub use crate::summary::{SentimentAggregator, SentimentSummary};

use std::sync::Arc;

use anyhow::Result;

/// Wire up the default aggregator: env credentials, configured feed list,
/// the two SQLite stores under the data dir, and the lexicon scorer.
pub fn default_aggregator() -> Result<SentimentAggregator> {
    let creds = collect::config::ApiCredentials::from_env();
    let feeds = collect::config::load_feeds_default()?;
    let dir = collect::config::data_dir();

    let news = Collector::news(Store::open_news(dir.join("news.db"))?, &creds, feeds);
    let social = Collector::social(Store::open_social(dir.join("social.db"))?, &creds);

    Ok(SentimentAggregator::new(
        news,
        social,
        Arc::new(LexiconScorer::new()),
    ))
}
