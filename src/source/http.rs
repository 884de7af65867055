// src/source/http.rs — Network-backed data source
//
// GET {base}/items?keyword=..&since=..&limit=..&<filters>
// Response: JSON array of {id, text, timestamp, author_id}.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{DataSource, FetchRequest};
use crate::core::types::Item;
use crate::infra::errors::MonitorError;

pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: String,
    text: String,
    timestamp: DateTime<Utc>,
    #[serde(alias = "user")]
    author_id: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn unavailable(&self, message: impl Into<String>) -> MonitorError {
        MonitorError::FetchUnavailable {
            source_name: self.name().to_string(),
            message: message.into(),
        }
    }
}

/// Flatten a request into query pairs. Non-string filter values are sent as JSON.
fn query_pairs(request: &FetchRequest) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("keyword".to_string(), request.keyword.clone()),
        ("limit".to_string(), request.limit.to_string()),
    ];
    if let Some(since) = request.since {
        pairs.push(("since".to_string(), since.to_rfc3339()));
    }
    for (key, value) in &request.filters {
        let v = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        pairs.push((key.clone(), v));
    }
    pairs
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Item>, MonitorError> {
        let resp = self
            .client
            .get(format!("{}/items", self.base_url))
            .header("user-agent", format!("pulsewatch/{}", env!("CARGO_PKG_VERSION")))
            .query(&query_pairs(request))
            .send()
            .await
            .map_err(|e| self.unavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {}", status.as_u16())));
        }

        let wire: Vec<WireItem> = resp
            .json()
            .await
            .map_err(|e| self.unavailable(format!("invalid response body: {e}")))?;

        Ok(wire
            .into_iter()
            .map(|w| Item::new(w.id, w.text, w.author_id, w.timestamp))
            .collect())
    }
}
