// src/collect/sources/stocktwits.rs
//! Public message-stream adapter (Stocktwits symbol stream). The JSON API is
//! unauthenticated but occasionally serves an interstitial HTML page; in that
//! case the adapter falls back to scraping message bodies out of the page.

use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::collect::types::{Candidate, CollectionError, SourceAdapter};
use crate::collect::{after_watermark, http_client};
use crate::normalize::{canonical_now, normalize_date, normalize_text};

const STREAM_URL: &str = "https://api.stocktwits.com/api/2/streams/symbol";
const PAGE_URL: &str = "https://stocktwits.com/symbol";
const SCRAPE_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    #[serde(default)]
    username: Option<String>,
}

pub struct StocktwitsAdapter;

impl StocktwitsAdapter {
    pub fn new() -> Self {
        Self
    }

    fn convert(resp: StreamResponse, watermark: Option<&str>) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(resp.messages.len());
        for msg in resp.messages {
            let body = normalize_text(msg.body.as_deref().unwrap_or_default());
            if body.is_empty() {
                continue;
            }
            let published_at = normalize_date(msg.created_at.as_deref());
            if !after_watermark(&published_at, watermark) {
                continue;
            }
            let url = match (msg.user.as_ref().and_then(|u| u.username.as_deref()), msg.id) {
                (Some(user), Some(id)) => Some(format!(
                    "https://stocktwits.com/{user}/message/{id}"
                )),
                _ => None,
            };
            out.push(Candidate {
                title: body,
                content: None,
                url,
                source: "Stocktwits".to_string(),
                published_at,
            });
        }
        out
    }

    /// Last-resort extraction from the symbol page HTML: pull message bodies
    /// out of the embedded state JSON. Timestamps are unknown here, so
    /// scraped items carry "now" and no watermark filter applies.
    fn scrape_html(html: &str) -> Vec<Candidate> {
        static RE_BODY: Lazy<Regex> =
            Lazy::new(|| Regex::new(r#""body"\s*:\s*"((?:[^"\\]|\\.){1,500})""#).unwrap());
        let mut out = Vec::new();
        for cap in RE_BODY.captures_iter(html).take(SCRAPE_LIMIT) {
            let raw = cap[1].replace("\\n", " ").replace("\\\"", "\"");
            let body = normalize_text(&raw);
            if body.is_empty() {
                continue;
            }
            out.push(Candidate {
                title: body,
                content: None,
                url: None,
                source: "Stocktwits (scrape)".to_string(),
                published_at: canonical_now(),
            });
        }
        out
    }

    /// Parse a canned stream response (tests).
    pub fn parse_fixture(
        json: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let resp: StreamResponse =
            serde_json::from_str(json).map_err(|e| CollectionError::Parse(e.to_string()))?;
        Ok(Self::convert(resp, watermark))
    }

    /// Run the HTML fallback over a canned page (tests).
    pub fn scrape_fixture(html: &str) -> Vec<Candidate> {
        Self::scrape_html(html)
    }
}

impl Default for StocktwitsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for StocktwitsAdapter {
    async fn fetch(
        &self,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let url = format!("{STREAM_URL}/{ticker}.json");
        let resp = http_client().get(&url).send().await?;
        if resp.status().is_success() {
            let text = resp.text().await?;
            match serde_json::from_str::<StreamResponse>(&text) {
                // The stream is symbol-scoped; no relevance re-check.
                Ok(stream) => return Ok(Self::convert(stream, watermark)),
                Err(e) => {
                    tracing::warn!(error = %e, "stocktwits stream unparseable; trying page scrape");
                    counter!("collect_source_errors_total").increment(1);
                }
            }
        }

        let page = http_client()
            .get(format!("{PAGE_URL}/{ticker}"))
            .send()
            .await?;
        if !page.status().is_success() {
            return Err(CollectionError::Http(format!(
                "stocktwits status {}",
                page.status()
            )));
        }
        let html = page.text().await?;
        Ok(Self::scrape_html(&html))
    }

    fn name(&self) -> &'static str {
        "stocktwits"
    }
}
