// src/notify/webhook.rs — Outbound webhook callbacks on alerts and errors
//
// Fires HTTP POST requests to configured URLs when an alert is confirmed
// or a cycle fails. Non-blocking (spawns a tokio task).

use serde::Serialize;

use super::EventSink;
use crate::core::events::{EventType, MonitorEvent};
use crate::infra::config::WebhookConfig;

/// JSON payload sent to the webhook URL.
#[derive(Debug, Serialize)]
struct WebhookPayload {
    event: String,
    timestamp: String,
    subject: String,
    cycle: u64,
    data: serde_json::Value,
}

pub struct WebhookSink {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// URL configured for this event type, if any.
    fn url_for(&self, event_type: EventType) -> Option<&str> {
        match event_type {
            EventType::AlertConfirmed => self.config.on_alert.as_deref(),
            EventType::ErrorOccurred => self.config.on_error.as_deref(),
            _ => None,
        }
    }
}

impl EventSink for WebhookSink {
    fn emit(&self, event: &MonitorEvent) {
        let Some(url) = self.url_for(event.event_type) else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; dropping webhook to {}", url);
            return;
        };

        let url = url.to_string();
        let payload = build_payload(event);
        let client = self.client.clone();
        handle.spawn(async move {
            if let Err(e) = send_webhook(&client, &url, &payload).await {
                tracing::warn!("Webhook delivery to {} failed: {}", url, e);
            }
        });
    }
}

/// Build the JSON payload for an event.
fn build_payload(event: &MonitorEvent) -> WebhookPayload {
    let name = match event.event_type {
        EventType::AlertConfirmed => "alert.confirmed",
        EventType::ErrorOccurred => "cycle.error",
        other => other.as_str(),
    };
    WebhookPayload {
        event: name.to_string(),
        timestamp: event.timestamp.to_rfc3339(),
        subject: event.subject.clone(),
        cycle: event.cycle,
        data: event.payload.clone(),
    }
}

/// Send the webhook POST request.
async fn send_webhook(
    client: &reqwest::Client,
    url: &str,
    payload: &WebhookPayload,
) -> anyhow::Result<()> {
    let resp = client
        .post(url)
        .header("content-type", "application/json")
        .header(
            "user-agent",
            format!("pulsewatch/{}", env!("CARGO_PKG_VERSION")),
        )
        .json(payload)
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(
            "Webhook returned HTTP {}: {}",
            status.as_u16(),
            truncate(&body, 200)
        );
    } else {
        tracing::debug!("Webhook delivered to {} (HTTP {})", url, status.as_u16());
    }

    Ok(())
}

/// Truncate a string for logging without splitting a character.
fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_type: EventType) -> MonitorEvent {
        MonitorEvent {
            event_type,
            timestamp: chrono::Utc::now(),
            subject: "acme".into(),
            cycle: 4,
            payload: serde_json::json!({ "confidence": 0.91 }),
        }
    }

    #[test]
    fn test_build_payload_alert() {
        let payload = build_payload(&event(EventType::AlertConfirmed));
        assert_eq!(payload.event, "alert.confirmed");
        assert_eq!(payload.subject, "acme");
        assert_eq!(payload.cycle, 4);
        assert_eq!(payload.data["confidence"], 0.91);
        assert!(!payload.timestamp.is_empty());
    }

    #[test]
    fn test_build_payload_error() {
        assert_eq!(build_payload(&event(EventType::ErrorOccurred)).event, "cycle.error");
    }

    #[test]
    fn test_url_routing() {
        let sink = WebhookSink::new(WebhookConfig {
            on_alert: Some("http://hooks/alert".into()),
            on_error: None,
        });
        assert_eq!(sink.url_for(EventType::AlertConfirmed), Some("http://hooks/alert"));
        assert_eq!(sink.url_for(EventType::ErrorOccurred), None);
        assert_eq!(sink.url_for(EventType::CycleStarted), None);
    }

    #[test]
    fn test_emit_without_runtime_is_noop() {
        let sink = WebhookSink::new(WebhookConfig {
            on_alert: Some("http://127.0.0.1:9/alert".into()),
            on_error: None,
        });
        sink.emit(&event(EventType::AlertConfirmed));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello");
        assert_eq!(truncate("héllo", 2), "h");
    }
}
