// src/infra/config.rs — Configuration loading (TOML)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::infra::errors::MonitorError;
use crate::infra::paths;

/// Longest accepted cadence (30 days). Plans never sleep longer.
pub const MAX_CADENCE_SECS: u64 = 30 * 24 * 3600;
/// Longest accepted aggregation window (one year).
pub const MAX_WINDOW_SECS: u64 = 366 * 24 * 3600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// One independent control loop is started per subject.
    #[serde(default)]
    pub subjects: Vec<SubjectConfig>,

    #[serde(default)]
    pub baseline: BaselineConfig,

    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub notify: NotifyConfig,
}

/// User configuration for one tracked subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectConfig {
    pub keyword: String,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    /// Seconds between cycle starts.
    #[serde(default = "default_cadence")]
    pub cadence: u64,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    #[serde(default = "default_sample_size")]
    pub sample_size: u32,
    #[serde(default)]
    pub filters: BTreeMap<String, serde_json::Value>,
}

fn default_cadence() -> u64 {
    60
}

fn default_sensitivity() -> f64 {
    0.8
}

fn default_sample_size() -> u32 {
    200
}

impl SubjectConfig {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            since: None,
            cadence: default_cadence(),
            sensitivity: default_sensitivity(),
            sample_size: default_sample_size(),
            filters: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.keyword.trim().is_empty() {
            return Err(MonitorError::Config("subject keyword is empty".into()));
        }
        if self.cadence == 0 || self.cadence > MAX_CADENCE_SECS {
            return Err(MonitorError::Config(format!(
                "subject '{}': cadence {} outside 1..={}",
                self.keyword, self.cadence, MAX_CADENCE_SECS
            )));
        }
        if self.sample_size == 0 {
            return Err(MonitorError::Config(format!(
                "subject '{}': sample_size must be > 0",
                self.keyword
            )));
        }
        if !(0.0..=1.0).contains(&self.sensitivity) {
            return Err(MonitorError::Config(format!(
                "subject '{}': sensitivity {} outside [0, 1]",
                self.keyword, self.sensitivity
            )));
        }
        Ok(())
    }
}

/// Fixed reference distribution for the z-score. Not learned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub mean: f64,
    pub std_dev: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            mean: -0.1,
            std_dev: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub min_sample_count: u64,
    pub z_threshold: f64,
    pub negative_fraction_threshold: f64,
    pub min_distinct_authors: usize,
    /// Decisions below this confidence ask for a larger sample.
    pub adjust_below_confidence: f64,
    pub sample_size_bump: i64,
    pub summary_items: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            min_sample_count: 10,
            z_threshold: 2.5,
            negative_fraction_threshold: 0.5,
            min_distinct_authors: 3,
            adjust_below_confidence: 0.5,
            sample_size_bump: 50,
            summary_items: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub min_cadence_secs: u64,
    pub min_sample_limit: u32,
    /// Deltas with a larger magnitude are treated as corrupt and skipped.
    pub max_abs_delta: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_cadence_secs: 10,
            min_sample_limit: 10,
            max_abs_delta: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Upper bound on every fetch/classify call.
    pub call_timeout_secs: u64,
    /// Aggregation window; unset aggregates the whole batch.
    #[serde(default)]
    pub window_secs: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: 30,
            window_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Simulated,
    Fixture,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// Base URL for `http`.
    #[serde(default)]
    pub url: Option<String>,
    /// JSON file of items for `fixture`.
    #[serde(default)]
    pub path: Option<String>,
    /// Seed for `simulated`.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    7
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            url: None,
            path: None,
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Lexicon,
    Http,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub kind: ClassifierKind,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Append every event to a JSON-lines log.
    #[serde(default = "default_true")]
    pub event_log: bool,
    /// Overrides the default `state/events.jsonl` location.
    #[serde(default)]
    pub event_log_path: Option<String>,
    #[serde(default)]
    pub webhooks: WebhookConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            event_log: true,
            event_log_path: None,
            webhooks: WebhookConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Outbound webhook URLs, one per event kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub on_alert: Option<String>,
    #[serde(default)]
    pub on_error: Option<String>,
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check every subject and the cross-section invariants.
    pub fn validate(&self) -> Result<(), MonitorError> {
        for subject in &self.subjects {
            subject.validate()?;
        }
        if !self.baseline.std_dev.is_finite() || self.baseline.std_dev < 0.0 {
            return Err(MonitorError::Config(format!(
                "baseline std_dev {} must be a non-negative number",
                self.baseline.std_dev
            )));
        }
        if let Some(window) = self.runtime.window_secs {
            if window == 0 || window > MAX_WINDOW_SECS {
                return Err(MonitorError::Config(format!(
                    "runtime.window_secs {window} outside 1..={MAX_WINDOW_SECS}"
                )));
            }
        }
        if self.policy.max_abs_delta <= 0 {
            return Err(MonitorError::Config(
                "policy.max_abs_delta must be > 0".into(),
            ));
        }
        if self.source.kind == SourceKind::Http && self.source.url.is_none() {
            return Err(MonitorError::Config("source.kind = \"http\" needs source.url".into()));
        }
        if self.source.kind == SourceKind::Fixture && self.source.path.is_none() {
            return Err(MonitorError::Config(
                "source.kind = \"fixture\" needs source.path".into(),
            ));
        }
        if self.classifier.kind == ClassifierKind::Http && self.classifier.url.is_none() {
            return Err(MonitorError::Config(
                "classifier.kind = \"http\" needs classifier.url".into(),
            ));
        }
        Ok(())
    }

    /// Starter config written by `pulsewatch config`.
    pub fn default_toml() -> anyhow::Result<String> {
        let mut config = Config::default();
        config.subjects.push(SubjectConfig::new("acme"));
        Ok(toml::to_string_pretty(&config)?)
    }
}
