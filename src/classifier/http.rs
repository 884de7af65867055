// src/classifier/http.rs — Network-backed sentiment classifier
//
// POST {base}/classify  {"texts": [...]}
// Response: JSON array of {label, score, confidence}, same order as input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SentimentClassifier;
use crate::core::types::{Sentiment, SentimentLabel};
use crate::infra::errors::MonitorError;

pub struct HttpClassifier {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct WireSentiment {
    label: String,
    score: f64,
    confidence: f64,
}

impl HttpClassifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn unavailable(&self, message: impl Into<String>) -> MonitorError {
        MonitorError::ClassifierUnavailable {
            classifier: self.name().to_string(),
            message: message.into(),
        }
    }
}

/// Accepts both long (`NEGATIVE`) and short (`NEG`) label spellings.
fn parse_label(label: &str) -> Option<SentimentLabel> {
    match label.trim().to_uppercase().as_str() {
        "POSITIVE" | "POS" => Some(SentimentLabel::Positive),
        "NEGATIVE" | "NEG" => Some(SentimentLabel::Negative),
        "NEUTRAL" | "NEU" => Some(SentimentLabel::Neutral),
        _ => None,
    }
}

#[async_trait]
impl SentimentClassifier for HttpClassifier {
    fn name(&self) -> &str {
        "http"
    }

    async fn classify(&self, texts: &[String]) -> Result<Vec<Sentiment>, MonitorError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let resp = self
            .client
            .post(format!("{}/classify", self.base_url))
            .header("content-type", "application/json")
            .json(&ClassifyRequest { texts })
            .send()
            .await
            .map_err(|e| self.unavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {}", status.as_u16())));
        }

        let wire: Vec<WireSentiment> = resp
            .json()
            .await
            .map_err(|e| self.unavailable(format!("invalid response body: {e}")))?;

        wire.into_iter()
            .map(|w| {
                let label = parse_label(&w.label)
                    .ok_or_else(|| self.unavailable(format!("unknown label '{}'", w.label)))?;
                Ok(Sentiment::new(label, w.score, w.confidence))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_spellings() {
        assert_eq!(parse_label("NEG"), Some(SentimentLabel::Negative));
        assert_eq!(parse_label("negative"), Some(SentimentLabel::Negative));
        assert_eq!(parse_label(" Pos "), Some(SentimentLabel::Positive));
        assert_eq!(parse_label("NEU"), Some(SentimentLabel::Neutral));
        assert_eq!(parse_label("mixed"), None);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        let c = HttpClassifier::new("http://127.0.0.1:1");
        assert!(c.classify(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_classifier_unavailable() {
        let c = HttpClassifier::new("http://127.0.0.1:1");
        let err = c.classify(&["hello".to_string()]).await.unwrap_err();
        assert!(matches!(err, MonitorError::ClassifierUnavailable { .. }));
    }
}
