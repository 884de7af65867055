// src/notify/mod.rs — Event sinks for the control loop
//
// Every loop event goes through one `EventSink`. Sinks never fail the
// loop: delivery problems are logged and dropped.

pub mod jsonl;
pub mod webhook;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::core::events::{EventType, MonitorEvent};
use crate::infra::config::NotifyConfig;
use crate::infra::paths;

pub use jsonl::JsonlSink;
pub use webhook::WebhookSink;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &MonitorEvent);
}

/// Logs every event through `tracing`. Alerts at warn, errors at error.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &MonitorEvent) {
        let kind = event.event_type.as_str();
        match event.event_type {
            EventType::AlertConfirmed => tracing::warn!(
                subject = %event.subject,
                cycle = event.cycle,
                payload = %event.payload,
                "{kind}"
            ),
            EventType::ErrorOccurred => tracing::error!(
                subject = %event.subject,
                cycle = event.cycle,
                payload = %event.payload,
                "{kind}"
            ),
            _ => tracing::info!(
                subject = %event.subject,
                cycle = event.cycle,
                payload = %event.payload,
                "{kind}"
            ),
        }
    }
}

/// Broadcasts to several sinks in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &MonitorEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

/// Keeps events in memory for inspection.
#[derive(Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<MonitorEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MonitorEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn of_type(&self, event_type: EventType) -> Vec<MonitorEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &MonitorEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Configured event log location, or the default under the state dir.
pub fn event_log_path(config: &NotifyConfig) -> PathBuf {
    config
        .event_log_path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(paths::event_log_path)
}

/// Sinks described by the `[notify]` config section, always led by tracing.
pub fn from_config(config: &NotifyConfig) -> FanoutSink {
    let mut fanout = FanoutSink::new().with(Arc::new(TracingSink));
    if config.event_log {
        fanout = fanout.with(Arc::new(JsonlSink::new(event_log_path(config))));
    }
    if config.webhooks.on_alert.is_some() || config.webhooks.on_error.is_some() {
        fanout = fanout.with(Arc::new(WebhookSink::new(config.webhooks.clone())));
    }
    fanout
}
