// src/classifier/mod.rs — Sentiment classifier layer

pub mod http;
pub mod lexicon;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::types::Sentiment;
use crate::infra::config::{ClassifierConfig, ClassifierKind};
use crate::infra::errors::MonitorError;

pub use http::HttpClassifier;
pub use lexicon::LexiconClassifier;

/// Pure text → sentiment function. Output has the same length and order as
/// the input.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, texts: &[String]) -> Result<Vec<Sentiment>, MonitorError>;
}

/// Build the configured classifier.
pub fn from_config(config: &ClassifierConfig) -> anyhow::Result<Arc<dyn SentimentClassifier>> {
    let classifier: Arc<dyn SentimentClassifier> = match config.kind {
        ClassifierKind::Lexicon => Arc::new(LexiconClassifier::default()),
        ClassifierKind::Http => {
            let url = config
                .url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("classifier.url is required for http classifiers"))?;
            Arc::new(HttpClassifier::new(url))
        }
    };
    Ok(classifier)
}
