// src/collect/sources/rss.rs
//! Feed-syndication adapter: iterates a fixed list of (url, label) pairs.
//! Failures are isolated per feed; a broken feed never hides the others.

use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::collect::config::Feed;
use crate::collect::types::{Candidate, CollectionError, SourceAdapter};
use crate::collect::{after_watermark, http_client, is_relevant};
use crate::normalize::{normalize_date, normalize_text};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// Parse one RSS document into candidates, applying relevance and watermark
/// filters locally. Shared with the Nitter adapter, which speaks the same
/// XML dialect.
pub(crate) fn parse_feed(
    xml: &str,
    source_tag: &str,
    ticker: &str,
    watermark: Option<&str>,
) -> Result<Vec<Candidate>, CollectionError> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss =
        from_str(&xml_clean).map_err(|e| CollectionError::Parse(e.to_string()))?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = normalize_text(it.title.as_deref().unwrap_or_default());
        let summary = normalize_text(it.description.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        if !is_relevant(ticker, &title, &summary) {
            continue;
        }
        let published_at = normalize_date(it.pub_date.as_deref());
        if !after_watermark(&published_at, watermark) {
            continue;
        }
        out.push(Candidate {
            title,
            content: (!summary.is_empty()).then_some(summary),
            url: it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            source: source_tag.to_string(),
            published_at,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("collect_parse_ms").record(ms);
    counter!("collect_candidates_parsed_total").increment(out.len() as u64);
    Ok(out)
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

pub struct FeedAdapter {
    feeds: Vec<Feed>,
}

impl FeedAdapter {
    pub fn new(feeds: Vec<Feed>) -> Self {
        Self { feeds }
    }

    /// Parse fixture XML as if it came from the named feed (tests).
    pub fn parse_fixture(
        xml: &str,
        label: &str,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        parse_feed(xml, &format!("RSS ({label})"), ticker, watermark)
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    async fn fetch(
        &self,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let mut out = Vec::new();
        for feed in &self.feeds {
            let body = match http_client().get(&feed.url).send().await {
                Ok(resp) => match resp.text().await {
                    Ok(b) => b,
                    Err(e) => {
                        tracing::warn!(error = %e, feed = %feed.label, "feed body read failed");
                        counter!("collect_source_errors_total").increment(1);
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, feed = %feed.label, "feed fetch failed");
                    counter!("collect_source_errors_total").increment(1);
                    continue;
                }
            };
            let tag = format!("RSS ({})", feed.label);
            match parse_feed(&body, &tag, ticker, watermark) {
                Ok(mut items) => {
                    tracing::debug!(feed = %feed.label, items = items.len(), "feed parsed");
                    out.append(&mut items);
                }
                Err(e) => {
                    tracing::warn!(error = %e, feed = %feed.label, "feed parse failed");
                    counter!("collect_source_errors_total").increment(1);
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}
