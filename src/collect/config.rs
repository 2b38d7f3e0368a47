// src/collect/config.rs
//! Environment credentials and the syndication feed list.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_FEEDS_PATH: &str = "NEWS_FEEDS_PATH";
pub const ENV_DATA_DIR: &str = "SENTIMENT_DATA_DIR";

/// API credentials, read once at process start. A missing key degrades that
/// one adapter to empty results; it is never a hard failure.
#[derive(Debug, Clone, Default)]
pub struct ApiCredentials {
    pub newsapi_key: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: Option<String>,
}

impl ApiCredentials {
    pub fn from_env() -> Self {
        Self {
            newsapi_key: non_empty_env("NEWSAPI_KEY"),
            reddit_client_id: non_empty_env("REDDIT_CLIENT_ID"),
            reddit_client_secret: non_empty_env("REDDIT_CLIENT_SECRET"),
            reddit_user_agent: non_empty_env("REDDIT_USER_AGENT"),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Where the two SQLite files live. Defaults to `data/`.
pub fn data_dir() -> PathBuf {
    non_empty_env(ENV_DATA_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Feed {
    pub url: String,
    pub label: String,
}

/// Built-in financial news feeds used when no config file overrides them.
pub fn default_feeds() -> Vec<Feed> {
    [
        ("https://feeds.bloomberg.com/markets/news.rss", "Bloomberg Markets"),
        ("https://feeds.reuters.com/money/wealth/rss", "Reuters Finance"),
        ("https://feeds.marketwatch.com/marketwatch/marketpulse/", "MarketWatch"),
        ("https://feeds.cnbc.com/cnbc/world.rss", "CNBC"),
    ]
    .into_iter()
    .map(|(url, label)| Feed {
        url: url.to_string(),
        label: label.to_string(),
    })
    .collect()
}

/// Load the feed list from an explicit path. Supports TOML or JSON.
pub fn load_feeds_from(path: &Path) -> Result<Vec<Feed>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, &ext)
}

/// Load the feed list using env var + fallbacks:
/// 1) $NEWS_FEEDS_PATH
/// 2) config/news_feeds.toml
/// 3) built-in defaults
pub fn load_feeds_default() -> Result<Vec<Feed>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        }
        return Err(anyhow!("NEWS_FEEDS_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/news_feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    Ok(default_feeds())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<Feed>> {
    if hint_ext == "toml" || s.contains("[[feeds]]") {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if hint_ext != "toml" {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed list format"))
}

fn parse_toml(s: &str) -> Result<Vec<Feed>> {
    #[derive(serde::Deserialize)]
    struct FeedsFile {
        feeds: Vec<Feed>,
    }
    let v: FeedsFile = toml::from_str(s)?;
    Ok(clean_feeds(v.feeds))
}

fn parse_json(s: &str) -> Result<Vec<Feed>> {
    let v: Vec<Feed> = serde_json::from_str(s)?;
    Ok(clean_feeds(v))
}

fn clean_feeds(items: Vec<Feed>) -> Vec<Feed> {
    let mut out: Vec<Feed> = Vec::new();
    for f in items {
        let url = f.url.trim().to_string();
        let label = f.label.trim().to_string();
        if url.is_empty() || label.is_empty() {
            continue;
        }
        if out.iter().any(|e| e.url == url) {
            continue;
        }
        out.push(Feed { url, label });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_formats_parse() {
        let toml = r#"
            [[feeds]]
            url = "https://a/rss"
            label = " A "

            [[feeds]]
            url = "https://a/rss"
            label = "dup"
        "#;
        let out = parse_feeds(toml, "toml").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "A");

        let json = r#"[{"url": "https://b/rss", "label": "B"}]"#;
        let out = parse_feeds(json, "json").unwrap();
        assert_eq!(out[0].label, "B");
    }

    #[test]
    fn defaults_are_present_and_labelled() {
        let feeds = default_feeds();
        assert_eq!(feeds.len(), 4);
        assert!(feeds.iter().all(|f| f.url.starts_with("https://")));
    }

    #[serial_test::serial]
    #[test]
    fn credentials_absent_means_none() {
        std::env::remove_var("NEWSAPI_KEY");
        std::env::set_var("REDDIT_CLIENT_ID", "  ");
        let creds = ApiCredentials::from_env();
        assert!(creds.newsapi_key.is_none());
        assert!(creds.reddit_client_id.is_none());
        std::env::remove_var("REDDIT_CLIENT_ID");
    }
}
