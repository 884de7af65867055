// src/notify/jsonl.rs — Append-only JSON-lines event log

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::EventSink;
use crate::core::events::MonitorEvent;
use crate::infra::errors::MonitorError;

pub struct JsonlSink {
    path: PathBuf,
    // Serializes writers so concurrent subjects never interleave lines.
    lock: Mutex<()>,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, event: &MonitorEvent) -> Result<(), MonitorError> {
        let line = serde_json::to_string(event).map_err(|e| self.failure(e))?;
        let _guard = self
            .lock
            .lock()
            .map_err(|_| self.failure("event log lock poisoned"))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.failure(e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.failure(e))?;
        writeln!(file, "{line}").map_err(|e| self.failure(e))
    }

    fn failure(&self, cause: impl std::fmt::Display) -> MonitorError {
        MonitorError::Notify(format!("{}: {cause}", self.path.display()))
    }
}

impl EventSink for JsonlSink {
    fn emit(&self, event: &MonitorEvent) {
        if let Err(e) = self.append(event) {
            tracing::warn!("Failed to append event: {}", e);
        }
    }
}

/// Last `n` events in the log, oldest first. Unparseable lines are skipped.
pub fn tail(path: &Path, n: usize) -> anyhow::Result<Vec<MonitorEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    let mut events: Vec<MonitorEvent> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| match serde_json::from_str(l) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!("Skipping malformed event line: {}", e);
                None
            }
        })
        .collect();
    let skip = events.len().saturating_sub(n);
    Ok(events.split_off(skip))
}
