// src/sentiment.rs
//! Sentiment scoring seam. The aggregator only sees `SentimentScorer`, so the
//! lexicon implementation below can be swapped for a model-backed one (or a
//! stub in tests) without touching the pipeline.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Opaque scoring capability: text in, compound polarity in [-1, 1] out.
/// Empty text scores 0.0.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// Lexicon-based scorer with a short negation window.
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Raw integer score plus token count. A negator in the previous 1..=3
    /// tokens inverts the sign of a lexicon hit.
    fn score_text(text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = Self::word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let (raw, tokens) = Self::score_text(text);
        if tokens == 0 {
            return 0.0;
        }
        // Squash the unbounded lexicon sum into [-1, 1]; a single strong
        // word lands well clear of the neutral band.
        (raw as f64 / 4.0).tanh()
    }
}

fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(LexiconScorer::new().score(""), 0.0);
        assert_eq!(LexiconScorer::new().score("   "), 0.0);
    }

    #[test]
    fn polarity_signs() {
        let s = LexiconScorer::new();
        assert!(s.score("Record profit, earnings surge on strong growth") > 0.0);
        assert!(s.score("Shares crash after fraud probe and layoffs") < 0.0);
        assert_eq!(s.score("The meeting is on Tuesday"), 0.0);
    }

    #[test]
    fn negation_flips_sign() {
        let s = LexiconScorer::new();
        let plain = s.score("growth this quarter");
        let negated = s.score("no growth this quarter");
        assert!(plain > 0.0);
        assert!(negated < 0.0);
    }

    #[test]
    fn scores_stay_in_range() {
        let s = LexiconScorer::new();
        let text = "surge surge surge surge crash crash rally rally rally profit profit";
        let v = s.score(text);
        assert!((-1.0..=1.0).contains(&v));
    }
}
