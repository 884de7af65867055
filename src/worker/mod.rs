// src/worker/mod.rs — One cycle's data path: fetch → clean → score → aggregate

pub mod aggregator;
pub mod clean;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::classifier::SentimentClassifier;
use crate::core::types::{Item, Plan, Signal};
use crate::infra::config::{BaselineConfig, Config};
use crate::infra::errors::MonitorError;
use crate::source::{DataSource, FetchRequest};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Signal plus the items that back it.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub signal: Signal,
    /// Negative items from the aggregated window.
    pub evidence: Vec<Item>,
    pub items_fetched: usize,
}

/// Stateless between cycles; everything it touches is owned by the caller.
pub struct Worker {
    source: Arc<dyn DataSource>,
    classifier: Arc<dyn SentimentClassifier>,
    baseline: BaselineConfig,
    window: Option<chrono::Duration>,
    call_timeout: Duration,
}

impl Worker {
    pub fn new(
        source: Arc<dyn DataSource>,
        classifier: Arc<dyn SentimentClassifier>,
        baseline: BaselineConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            baseline,
            window: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Worker with baseline, window and timeout taken from config. A window
    /// too large for the clock keeps every item.
    pub fn from_config(
        source: Arc<dyn DataSource>,
        classifier: Arc<dyn SentimentClassifier>,
        config: &Config,
    ) -> Self {
        let mut worker = Self::new(source, classifier, config.baseline)
            .with_call_timeout(Duration::from_secs(config.runtime.call_timeout_secs));
        let window = config
            .runtime
            .window_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(chrono::Duration::try_seconds);
        if let Some(window) = window {
            worker = worker.with_window(window);
        }
        worker
    }

    pub fn with_window(mut self, window: chrono::Duration) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Fetch raw items for the plan. Rejects plans that cannot be sampled.
    pub async fn fetch(&self, plan: &Plan) -> Result<Vec<Item>, MonitorError> {
        if plan.sample_limit == 0 {
            return Err(MonitorError::InvalidPlan {
                plan_id: plan.plan_id.clone(),
                reason: "sample limit must be > 0".into(),
            });
        }
        if plan.keyword.trim().is_empty() {
            return Err(MonitorError::InvalidPlan {
                plan_id: plan.plan_id.clone(),
                reason: "keyword is empty".into(),
            });
        }

        let request = FetchRequest::from(plan);
        let items = bounded(self.call_timeout, self.source.fetch(&request))
            .await
            .unwrap_or_else(|| {
                Err(MonitorError::FetchUnavailable {
                    source_name: self.source.name().to_string(),
                    message: format!("timed out after {}s", self.call_timeout.as_secs()),
                })
            })?;

        tracing::debug!(
            plan_id = %plan.plan_id,
            source = self.source.name(),
            fetched = items.len(),
            "Fetched items",
        );
        Ok(items)
    }

    pub fn clean(&self, items: Vec<Item>) -> Vec<Item> {
        clean::clean_items(items)
    }

    /// Score every item with one classifier call. Any failure fails the whole
    /// batch; items are never partially scored.
    pub async fn score(&self, mut items: Vec<Item>) -> Result<Vec<Item>, MonitorError> {
        let texts: Vec<String> = items.iter().map(|i| i.text().to_string()).collect();
        let name = self.classifier.name().to_string();

        let sentiments = bounded(self.call_timeout, self.classifier.classify(&texts))
            .await
            .unwrap_or_else(|| {
                Err(MonitorError::ClassifierUnavailable {
                    classifier: name.clone(),
                    message: format!("timed out after {}s", self.call_timeout.as_secs()),
                })
            })?;

        if sentiments.len() != items.len() {
            return Err(MonitorError::ClassifierUnavailable {
                classifier: name,
                message: format!(
                    "returned {} results for {} texts",
                    sentiments.len(),
                    items.len()
                ),
            });
        }

        for (item, sentiment) in items.iter_mut().zip(sentiments) {
            item.sentiment = Some(sentiment);
        }
        Ok(items)
    }

    /// Reduce scored items to a signal; negative items in the window become
    /// the evidence.
    pub fn aggregate(&self, items: &[Item]) -> CycleOutput {
        let selected = aggregator::select_window(items, self.window);
        let signal = aggregator::compute_signal(selected.iter().copied(), &self.baseline);
        let evidence = selected
            .into_iter()
            .filter(|i| i.is_negative())
            .cloned()
            .collect();
        CycleOutput {
            signal,
            evidence,
            items_fetched: items.len(),
        }
    }

    /// Run the whole data path in one call.
    pub async fn run_cycle(&self, plan: &Plan) -> Result<CycleOutput, MonitorError> {
        let items = self.fetch(plan).await?;
        let items = self.clean(items);
        let items = self.score(items).await?;
        Ok(self.aggregate(&items))
    }
}

/// Await `fut` for at most `limit`. `None` on expiry.
async fn bounded<T>(limit: Duration, fut: impl Future<Output = T>) -> Option<T> {
    tokio::time::timeout(limit, fut).await.ok()
}
