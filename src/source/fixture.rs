// src/source/fixture.rs — Deterministic in-memory data source

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{DataSource, FetchRequest};
use crate::core::types::Item;
use crate::infra::errors::MonitorError;

/// Serves pre-built batches. Each fetch returns the next batch (the last one
/// repeats), filtered by `since` and truncated to `limit`.
pub struct FixtureSource {
    batches: Vec<Vec<Item>>,
    calls: AtomicUsize,
}

impl FixtureSource {
    pub fn new(items: Vec<Item>) -> Self {
        Self::sequence(vec![items])
    }

    pub fn sequence(batches: Vec<Vec<Item>>) -> Self {
        Self {
            batches,
            calls: AtomicUsize::new(0),
        }
    }

    /// Load a JSON array of items.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let items: Vec<Item> = serde_json::from_str(&content)?;
        Ok(Self::new(items))
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Item>, MonitorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(batch) = self
            .batches
            .get(call)
            .or_else(|| self.batches.last())
        else {
            return Ok(Vec::new());
        };

        Ok(batch
            .iter()
            .filter(|item| request.since.is_none_or(|since| item.timestamp >= since))
            .take(request.limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn items(n: usize) -> Vec<Item> {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                Item::new(
                    format!("i-{i}"),
                    format!("post {i}"),
                    format!("user_{i}"),
                    base + Duration::minutes(i as i64),
                )
            })
            .collect()
    }

    fn request(limit: u32) -> FetchRequest {
        FetchRequest {
            keyword: "acme".into(),
            since: None,
            limit,
            filters: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_fixture_truncates_to_limit() {
        let source = FixtureSource::new(items(10));
        let got = source.fetch(&request(4)).await.unwrap();
        assert_eq!(got.len(), 4);
        assert_eq!(got[0].id, "i-0");
    }

    #[tokio::test]
    async fn test_fixture_filters_since() {
        let source = FixtureSource::new(items(10));
        let mut req = request(100);
        req.since = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 5, 0).unwrap());
        let got = source.fetch(&req).await.unwrap();
        assert_eq!(got.len(), 5);
        assert_eq!(got[0].id, "i-5");
    }

    #[tokio::test]
    async fn test_fixture_sequence_repeats_last_batch() {
        let source = FixtureSource::sequence(vec![items(1), items(3)]);
        assert_eq!(source.fetch(&request(10)).await.unwrap().len(), 1);
        assert_eq!(source.fetch(&request(10)).await.unwrap().len(), 3);
        assert_eq!(source.fetch(&request(10)).await.unwrap().len(), 3);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_fixture_empty_sequence() {
        let source = FixtureSource::sequence(vec![]);
        assert!(source.fetch(&request(10)).await.unwrap().is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, serde_json::to_string(&items(2)).unwrap()).unwrap();
        let source = FixtureSource::from_json_file(&path).unwrap();
        let got = tokio_test::block_on(source.fetch(&request(10))).unwrap();
        assert_eq!(got.len(), 2);
    }
}
