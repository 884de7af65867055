// src/classifier/lexicon.rs — Keyword-rule sentiment classifier
//
// Cues match anywhere in the lowercased text, inside longer words too
// ("nothing" carries "not"). Negative cues win over positive ones. Texts
// with no cue are neutral at half confidence.

use async_trait::async_trait;

use super::SentimentClassifier;
use crate::core::types::{Sentiment, SentimentLabel};
use crate::infra::errors::MonitorError;

const NEGATIVE_CUES: &[&str] = &["bad", "not", "hate"];
const POSITIVE_CUES: &[&str] = &["good", "great", "love"];

pub struct LexiconClassifier {
    negative: Vec<String>,
    positive: Vec<String>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new(NEGATIVE_CUES, POSITIVE_CUES)
    }
}

impl LexiconClassifier {
    pub fn new(negative: &[&str], positive: &[&str]) -> Self {
        Self {
            negative: negative.iter().map(|w| w.to_lowercase()).collect(),
            positive: positive.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn classify_one(&self, text: &str) -> Sentiment {
        let lower = text.to_lowercase();
        let has = |cues: &[String]| cues.iter().any(|c| lower.contains(c.as_str()));

        if has(&self.negative) {
            Sentiment::new(SentimentLabel::Negative, -0.8, 0.9)
        } else if has(&self.positive) {
            Sentiment::new(SentimentLabel::Positive, 0.8, 0.9)
        } else {
            Sentiment::new(SentimentLabel::Neutral, 0.0, 0.5)
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify(&self, texts: &[String]) -> Result<Vec<Sentiment>, MonitorError> {
        Ok(texts.iter().map(|t| self.classify_one(t)).collect())
    }
}
