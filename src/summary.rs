// src/summary.rs
//! Per-ticker sentiment summary: refresh both collectors, score the stored
//! window, blend news and social into one labelled score.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::collect::Collector;
use crate::normalize::canonical_now;
use crate::sentiment::SentimentScorer;
use crate::store::StoredRecord;

pub const POSITIVE_THRESHOLD: f64 = 0.1;
pub const NEGATIVE_THRESHOLD: f64 = -0.1;
const TOP_N: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SentimentSummary {
    pub ticker: String,
    pub analysis_period_days: i64,
    pub timestamp: String,
    pub overall_sentiment: OverallSentiment,
    pub news_sentiment: NewsSentiment,
    pub social_sentiment: SocialSentiment,
    pub total_data_points: usize,
    pub top_positive_news: Vec<RankedArticle>,
    pub top_negative_news: Vec<RankedArticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallSentiment {
    pub score: f64,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsSentiment {
    pub score: f64,
    pub article_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialSentiment {
    pub score: f64,
    pub post_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedArticle {
    pub title: String,
    pub url: String,
    pub published_at: String,
    pub sentiment_score: f64,
}

impl SentimentSummary {
    /// All-zero summary carrying an error note, for runs where the stores
    /// could not even be opened.
    pub fn degraded(ticker: &str, days: i64, error: String) -> Self {
        Self {
            ticker: ticker.to_string(),
            analysis_period_days: days,
            timestamp: canonical_now(),
            overall_sentiment: OverallSentiment {
                score: 0.0,
                label: "Neutral",
            },
            news_sentiment: NewsSentiment {
                score: 0.0,
                article_count: 0,
            },
            social_sentiment: SocialSentiment {
                score: 0.0,
                post_count: 0,
            },
            total_data_points: 0,
            top_positive_news: Vec::new(),
            top_negative_news: Vec::new(),
            error: Some(error),
        }
    }
}

pub fn label_for(score: f64) -> &'static str {
    if score > POSITIVE_THRESHOLD {
        "Positive"
    } else if score < NEGATIVE_THRESHOLD {
        "Negative"
    } else {
        "Neutral"
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Count-weighted blend of the two side means; 0.0 when there is no data.
pub fn blend(news_score: f64, news_count: usize, social_score: f64, social_count: usize) -> f64 {
    let total = news_count + social_count;
    if total == 0 {
        return 0.0;
    }
    (news_score * news_count as f64 + social_score * social_count as f64) / total as f64
}

pub struct SentimentAggregator {
    news: Collector,
    social: Collector,
    scorer: Arc<dyn SentimentScorer>,
}

struct SideResult {
    score: f64,
    count: usize,
    ranked: Vec<RankedArticle>,
    error: Option<String>,
}

impl SentimentAggregator {
    pub fn new(news: Collector, social: Collector, scorer: Arc<dyn SentimentScorer>) -> Self {
        Self {
            news,
            social,
            scorer,
        }
    }

    /// Collect fresh data for the ticker, then summarize the last `days`
    /// days. Never fails outright: a broken side degrades to zeroed counts
    /// with an error note.
    pub async fn summarize(&self, ticker: &str, days: i64) -> SentimentSummary {
        self.news.collect(ticker).await;
        self.social.collect(ticker).await;
        self.summarize_stored(ticker, days)
    }

    /// Score only what is already in the stores (no refresh).
    pub fn summarize_stored(&self, ticker: &str, days: i64) -> SentimentSummary {
        // Day-floored window start, so "7 days" means full calendar days.
        let since = (Utc::now() - Duration::days(days.max(0)))
            .format("%Y-%m-%d")
            .to_string();

        let news = self.score_side(&self.news, ticker, &since, true);
        let social = self.score_side(&self.social, ticker, &since, false);

        let overall = round3(blend(news.score, news.count, social.score, social.count));
        let (top_positive_news, top_negative_news) = split_top(news.ranked);

        let error = match (news.error, social.error) {
            (None, None) => None,
            (a, b) => Some(
                [a, b]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        };

        SentimentSummary {
            ticker: ticker.to_string(),
            analysis_period_days: days,
            timestamp: canonical_now(),
            overall_sentiment: OverallSentiment {
                score: overall,
                label: label_for(overall),
            },
            news_sentiment: NewsSentiment {
                score: news.score,
                article_count: news.count,
            },
            social_sentiment: SocialSentiment {
                score: social.score,
                post_count: social.count,
            },
            total_data_points: news.count + social.count,
            top_positive_news,
            top_negative_news,
            error,
        }
    }

    fn score_side(&self, side: &Collector, ticker: &str, since: &str, rank: bool) -> SideResult {
        let records = match side.store().query_since(ticker, since) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, ticker, "store query failed");
                return SideResult {
                    score: 0.0,
                    count: 0,
                    ranked: Vec::new(),
                    error: Some(e.to_string()),
                };
            }
        };
        if records.is_empty() {
            return SideResult {
                score: 0.0,
                count: 0,
                ranked: Vec::new(),
                error: None,
            };
        }

        let mut sum = 0.0;
        let mut ranked = Vec::with_capacity(if rank { records.len() } else { 0 });
        for r in &records {
            let score = self.scorer.score(&scoring_text(r));
            sum += score;
            if rank {
                ranked.push(RankedArticle {
                    title: r.title.clone(),
                    url: r.url.clone(),
                    published_at: r.published_at.clone(),
                    sentiment_score: round3(score),
                });
            }
        }

        SideResult {
            score: round3(sum / records.len() as f64),
            count: records.len(),
            ranked,
            error: None,
        }
    }
}

fn scoring_text(r: &StoredRecord) -> String {
    format!("{}; {}", r.title, r.content.as_deref().unwrap_or_default())
}

/// Split scored articles into the top positives (best first) and the top
/// negatives (most negative first).
fn split_top(mut ranked: Vec<RankedArticle>) -> (Vec<RankedArticle>, Vec<RankedArticle>) {
    ranked.sort_by(|a, b| {
        b.sentiment_score
            .partial_cmp(&a.sentiment_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top_positive: Vec<RankedArticle> = ranked
        .iter()
        .filter(|a| a.sentiment_score > 0.0)
        .take(TOP_N)
        .cloned()
        .collect();

    // rev() walks the descending sort backwards, so this is already
    // most-negative-first.
    let top_negative: Vec<RankedArticle> = ranked
        .iter()
        .rev()
        .filter(|a| a.sentiment_score < 0.0)
        .take(TOP_N)
        .cloned()
        .collect();

    (top_positive, top_negative)
}
