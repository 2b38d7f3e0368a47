// src/collect/sources/newsapi.rs
//! REST news API adapter (newsapi.org `everything` endpoint). Without an API
//! key the adapter degrades to an empty result rather than erroring.

use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::collect::types::{Candidate, CollectionError, SourceAdapter};
use crate::collect::{after_watermark, http_client, is_relevant};
use crate::normalize::{normalize_date, normalize_text};

const ENDPOINT: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<NewsApiSource>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

pub struct NewsApiAdapter {
    api_key: Option<String>,
}

impl NewsApiAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    fn convert(
        articles: Vec<NewsApiArticle>,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(articles.len());
        for article in articles {
            let title = normalize_text(article.title.as_deref().unwrap_or_default());
            let summary = normalize_text(article.description.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            // The query is ticker-derived but provider matching is fuzzy;
            // re-check relevance locally.
            if !is_relevant(ticker, &title, &summary) {
                continue;
            }
            let published_at = normalize_date(article.published_at.as_deref());
            if !after_watermark(&published_at, watermark) {
                continue;
            }
            let provider = article
                .source
                .and_then(|s| s.name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "NewsAPI".to_string());
            out.push(Candidate {
                title,
                content: (!summary.is_empty()).then_some(summary),
                url: article.url.filter(|u| !u.trim().is_empty()),
                source: format!("NewsAPI ({provider})"),
                published_at,
            });
        }
        out
    }

    /// Parse a canned API response (tests).
    pub fn parse_fixture(
        json: &str,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let resp: NewsApiResponse =
            serde_json::from_str(json).map_err(|e| CollectionError::Parse(e.to_string()))?;
        Ok(Self::convert(resp.articles, ticker, watermark))
    }
}

#[async_trait]
impl SourceAdapter for NewsApiAdapter {
    async fn fetch(
        &self,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let Some(key) = self.api_key.as_deref() else {
            tracing::debug!("no NewsAPI key; skipping");
            return Ok(Vec::new());
        };

        let query = format!("{ticker} OR \"{ticker} stock\"");
        let mut params = vec![
            ("q", query),
            ("sortBy", "publishedAt".to_string()),
            ("language", "en".to_string()),
            ("apiKey", key.to_string()),
        ];
        // Bound the window server-side too: `from` takes the date part of the
        // watermark. The adapter still filters locally below the day grain.
        if let Some(wm) = watermark {
            if wm.len() >= 10 {
                params.push(("from", wm[..10].to_string()));
            }
        }

        let resp = http_client().get(ENDPOINT).query(&params).send().await?;
        if !resp.status().is_success() {
            counter!("collect_source_errors_total").increment(1);
            return Err(CollectionError::Http(format!(
                "newsapi status {}",
                resp.status()
            )));
        }
        let body: NewsApiResponse = resp
            .json()
            .await
            .map_err(|e| CollectionError::Parse(e.to_string()))?;
        Ok(Self::convert(body.articles, ticker, watermark))
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
