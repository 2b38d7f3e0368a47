// src/collect/sources/yahoo.rs
//! Financial-data-provider news adapter (Yahoo Finance search endpoint).
//! The provider nests article fields inconsistently; extraction is defensive
//! and skips malformed items one by one instead of aborting the batch.

use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::collect::types::{Candidate, CollectionError, SourceAdapter};
use crate::collect::{after_watermark, http_client};
use crate::normalize::{normalize_date, normalize_text};

const ENDPOINT: &str = "https://query1.finance.yahoo.com/v1/finance/search";
const NEWS_COUNT: u32 = 20;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    content: Option<NewsContent>,
}

#[derive(Debug, Deserialize)]
struct NewsContent {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(default, rename = "clickThroughUrl")]
    click_through_url: Option<UrlHolder>,
    #[serde(default, rename = "canonicalUrl")]
    canonical_url: Option<UrlHolder>,
}

#[derive(Debug, Deserialize)]
struct UrlHolder {
    #[serde(default)]
    url: Option<String>,
}

pub struct YahooNewsAdapter;

impl YahooNewsAdapter {
    pub fn new() -> Self {
        Self
    }

    fn convert(items: Vec<NewsItem>, ticker: &str, watermark: Option<&str>) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let Some(c) = Self::candidate_from_item(item, ticker, watermark) else {
                continue;
            };
            out.push(c);
        }
        out
    }

    fn candidate_from_item(
        item: NewsItem,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Option<Candidate> {
        let content = item.content;
        // Title can live at the top level or inside `content`.
        let title_raw = content
            .as_ref()
            .and_then(|c| c.title.clone())
            .or(item.title)?;
        let title = normalize_text(&title_raw);
        if title.is_empty() {
            return None;
        }

        // URL, in order of preference: clickThroughUrl, canonicalUrl, link.
        let url = content
            .as_ref()
            .and_then(|c| c.click_through_url.as_ref())
            .and_then(|u| u.url.clone())
            .or_else(|| {
                content
                    .as_ref()
                    .and_then(|c| c.canonical_url.as_ref())
                    .and_then(|u| u.url.clone())
            })
            .or(item.link)
            .filter(|u| !u.trim().is_empty());

        let summary = content
            .as_ref()
            .and_then(|c| c.summary.as_deref())
            .map(normalize_text)
            .filter(|s| !s.is_empty());

        let published_at = normalize_date(content.as_ref().and_then(|c| c.pub_date.as_deref()));
        if !after_watermark(&published_at, watermark) {
            return None;
        }

        Some(Candidate {
            title,
            content: summary,
            url,
            source: format!("Yahoo Finance ({ticker})"),
            published_at,
        })
    }

    /// Parse a canned API response (tests).
    pub fn parse_fixture(
        json: &str,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let resp: SearchResponse =
            serde_json::from_str(json).map_err(|e| CollectionError::Parse(e.to_string()))?;
        Ok(Self::convert(resp.news, ticker, watermark))
    }
}

impl Default for YahooNewsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for YahooNewsAdapter {
    async fn fetch(
        &self,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let count = NEWS_COUNT.to_string();
        let resp = http_client()
            .get(ENDPOINT)
            .query(&[("q", ticker), ("newsCount", count.as_str()), ("quotesCount", "0")])
            .send()
            .await?;
        if !resp.status().is_success() {
            counter!("collect_source_errors_total").increment(1);
            return Err(CollectionError::Http(format!(
                "yahoo status {}",
                resp.status()
            )));
        }
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| CollectionError::Parse(e.to_string()))?;
        // The endpoint is already ticker-scoped; no substring re-check here.
        Ok(Self::convert(body.news, ticker, watermark))
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
