// src/collect/sources/nitter.rs
//! Syndication surrogate for a microblogging platform: Nitter search feeds.
//! Instances come and go, so the adapter walks a fixed list until one of
//! them answers with entries.

use async_trait::async_trait;
use metrics::counter;

use crate::collect::http_client;
use crate::collect::sources::rss::parse_feed;
use crate::collect::types::{Candidate, CollectionError, SourceAdapter};

const INSTANCES: &[&str] = &["https://nitter.net", "https://nitter.poast.org"];

pub struct NitterAdapter {
    instances: Vec<String>,
}

impl NitterAdapter {
    pub fn new() -> Self {
        Self {
            instances: INSTANCES.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn instance_host(instance: &str) -> &str {
        instance.trim_start_matches("https://").trim_start_matches("http://")
    }
}

impl Default for NitterAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for NitterAdapter {
    async fn fetch(
        &self,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let mut last_err = None;
        let mut any_answered = false;
        for instance in &self.instances {
            // Cashtag search, e.g. `$AAPL`.
            let url = format!("{instance}/search/rss?f=tweets&q=%24{ticker}");
            let body = match http_client().get(&url).send().await {
                Ok(resp) if resp.status().is_success() => match resp.text().await {
                    Ok(b) => b,
                    Err(e) => {
                        last_err = Some(CollectionError::Http(e.to_string()));
                        continue;
                    }
                },
                Ok(resp) => {
                    last_err = Some(CollectionError::Http(format!(
                        "nitter status {}",
                        resp.status()
                    )));
                    continue;
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            };
            let tag = format!("Nitter ({})", Self::instance_host(instance));
            match parse_feed(&body, &tag, ticker, watermark) {
                Ok(items) if !items.is_empty() => return Ok(items),
                Ok(_) => any_answered = true,
                Err(e) => {
                    tracing::warn!(error = %e, instance = %instance, "nitter parse failed");
                    counter!("collect_source_errors_total").increment(1);
                    last_err = Some(e);
                }
            }
        }
        match (any_answered, last_err) {
            // Every instance failed outright.
            (false, Some(e)) => Err(e),
            _ => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "nitter"
    }
}
