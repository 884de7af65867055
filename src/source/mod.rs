// src/source/mod.rs — Data source layer

pub mod fixture;
pub mod http;
pub mod simulated;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::core::types::{Filters, Item, Plan};
use crate::infra::config::{SourceConfig, SourceKind};
use crate::infra::errors::MonitorError;

pub use fixture::FixtureSource;
pub use http::HttpSource;
pub use simulated::SimulatedSource;

/// Parameters for one fetch call, taken from the cycle's plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    pub keyword: String,
    pub since: Option<DateTime<Utc>>,
    pub limit: u32,
    pub filters: Filters,
}

impl From<&Plan> for FetchRequest {
    fn from(plan: &Plan) -> Self {
        Self {
            keyword: plan.keyword.clone(),
            since: plan.since,
            limit: plan.sample_limit,
            filters: plan.filters.clone(),
        }
    }
}

/// Supplies raw items for a keyword. Implementations must return items with
/// unique ids and a populated author id; ordering carries no meaning.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Item>, MonitorError>;
}

/// Build the configured data source.
pub fn from_config(config: &SourceConfig) -> anyhow::Result<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match config.kind {
        SourceKind::Simulated => Arc::new(SimulatedSource::new(config.seed)),
        SourceKind::Fixture => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("source.path is required for fixture sources"))?;
            Arc::new(FixtureSource::from_json_file(std::path::Path::new(path))?)
        }
        SourceKind::Http => {
            let url = config
                .url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("source.url is required for http sources"))?;
            Arc::new(HttpSource::new(url))
        }
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_request_from_plan() {
        let mut filters = Filters::new();
        filters.insert("lang".into(), serde_json::json!("en"));
        let plan = Plan {
            plan_id: "p".into(),
            keyword: "acme".into(),
            since: None,
            sample_limit: 25,
            cadence_seconds: 60,
            sensitivity: 0.8,
            filters,
            created_at: Utc::now(),
        };
        let req = FetchRequest::from(&plan);
        assert_eq!(req.keyword, "acme");
        assert_eq!(req.limit, 25);
        assert_eq!(req.filters["lang"], "en");
    }

    #[test]
    fn test_from_config_fixture_needs_path() {
        let config = SourceConfig {
            kind: SourceKind::Fixture,
            ..Default::default()
        };
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_default_is_simulated() {
        let source = from_config(&SourceConfig::default()).unwrap();
        assert_eq!(source.name(), "simulated");
    }
}
