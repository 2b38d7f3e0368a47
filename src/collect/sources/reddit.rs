// src/collect/sources/reddit.rs
//! Forum-style social adapter (Reddit). Uses app-only OAuth; missing
//! credentials degrade the adapter to an empty result.

use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::collect::config::ApiCredentials;
use crate::collect::types::{Candidate, CollectionError, SourceAdapter};
use crate::collect::{after_watermark, http_client, is_relevant};
use crate::normalize::{canonical_from_unix, normalize_text};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const SEARCH_URL: &str = "https://oauth.reddit.com/r/stocks+investing+wallstreetbets/search";
const DEFAULT_USER_AGENT: &str = "ticker-sentiment/0.1";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    subreddit: Option<String>,
    #[serde(default)]
    created_utc: Option<f64>,
}

pub struct RedditAdapter {
    client_id: Option<String>,
    client_secret: Option<String>,
    user_agent: String,
}

impl RedditAdapter {
    pub fn new(creds: &ApiCredentials) -> Self {
        Self {
            client_id: creds.reddit_client_id.clone(),
            client_secret: creds.reddit_client_secret.clone(),
            user_agent: creds
                .reddit_user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }

    async fn app_token(&self, id: &str, secret: &str) -> Result<String, CollectionError> {
        let resp = http_client()
            .post(TOKEN_URL)
            .basic_auth(id, Some(secret))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(CollectionError::Credentials(format!(
                "reddit token status {}",
                resp.status()
            )));
        }
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| CollectionError::Parse(e.to_string()))?;
        Ok(token.access_token)
    }

    fn convert(listing: Listing, ticker: &str, watermark: Option<&str>) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(listing.data.children.len());
        for child in listing.data.children {
            let post = child.data;
            let title = normalize_text(post.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let body = normalize_text(post.selftext.as_deref().unwrap_or_default());
            // Search matching is broad; keep only posts that actually name
            // the ticker.
            if !is_relevant(ticker, &title, &body) {
                continue;
            }
            let published_at = match post.created_utc {
                Some(secs) if secs.is_finite() && secs > 0.0 => canonical_from_unix(secs as i64),
                _ => continue,
            };
            if !after_watermark(&published_at, watermark) {
                continue;
            }
            let sub = post.subreddit.unwrap_or_else(|| "stocks".to_string());
            out.push(Candidate {
                title,
                content: (!body.is_empty()).then_some(body),
                url: post
                    .permalink
                    .filter(|p| !p.trim().is_empty())
                    .map(|p| format!("https://reddit.com{p}")),
                source: format!("Reddit (r/{sub})"),
                published_at,
            });
        }
        out
    }

    /// Parse a canned listing response (tests).
    pub fn parse_fixture(
        json: &str,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let listing: Listing =
            serde_json::from_str(json).map_err(|e| CollectionError::Parse(e.to_string()))?;
        Ok(Self::convert(listing, ticker, watermark))
    }
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    async fn fetch(
        &self,
        ticker: &str,
        watermark: Option<&str>,
    ) -> Result<Vec<Candidate>, CollectionError> {
        let (Some(id), Some(secret)) = (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            tracing::debug!("no Reddit credentials; skipping");
            return Ok(Vec::new());
        };

        let token = self.app_token(id, secret).await?;
        let resp = http_client()
            .get(SEARCH_URL)
            .bearer_auth(&token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("q", ticker),
                ("sort", "new"),
                ("restrict_sr", "1"),
                ("limit", "100"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            counter!("collect_source_errors_total").increment(1);
            return Err(CollectionError::Http(format!(
                "reddit search status {}",
                resp.status()
            )));
        }
        let listing: Listing = resp
            .json()
            .await
            .map_err(|e| CollectionError::Parse(e.to_string()))?;
        Ok(Self::convert(listing, ticker, watermark))
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}
