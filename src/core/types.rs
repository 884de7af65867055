// src/core/types.rs — Core domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Source-specific fetch filters, passed through untouched.
pub type Filters = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "POSITIVE"),
            SentimentLabel::Negative => write!(f, "NEGATIVE"),
            SentimentLabel::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// One classifier verdict. Score is in [-1, 1], confidence in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: f64,
}

impl Sentiment {
    /// Build a sentiment, clamping out-of-range values. NaN becomes 0.
    pub fn new(label: SentimentLabel, score: f64, confidence: f64) -> Self {
        let clamp = |v: f64, lo: f64, hi: f64| if v.is_nan() { 0.0 } else { v.clamp(lo, hi) };
        Self {
            label,
            score: clamp(score, -1.0, 1.0),
            confidence: clamp(confidence, 0.0, 1.0),
        }
    }
}

/// One observed text unit. Created by fetch, filled in by clean and score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    pub raw_text: String,
    #[serde(default)]
    pub cleaned_text: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub author_id: String,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        raw_text: impl Into<String>,
        author_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
            cleaned_text: None,
            timestamp,
            author_id: author_id.into(),
            sentiment: None,
        }
    }

    /// Cleaned text when available, raw text otherwise.
    pub fn text(&self) -> &str {
        self.cleaned_text.as_deref().unwrap_or(&self.raw_text)
    }

    pub fn label(&self) -> Option<SentimentLabel> {
        self.sentiment.map(|s| s.label)
    }

    pub fn is_negative(&self) -> bool {
        self.label() == Some(SentimentLabel::Negative)
    }
}

/// Aggregate statistics over one cycle's items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub sample_count: u64,
    pub negative_fraction: f64,
    pub mean_score: f64,
    pub z_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Confirm,
    Reject,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Confirm => write!(f, "CONFIRM"),
            Verdict::Reject => write!(f, "REJECT"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    InsufficientSample,
    HighZAndNeg,
    LowDiversity,
    NotSignificant,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientSample => "insufficient_sample",
            Self::HighZAndNeg => "high_z_and_neg",
            Self::LowDiversity => "low_diversity",
            Self::NotSignificant => "not_significant",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deltas the evaluator asks the planner to apply. Absent fields are untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyAdjustment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence_delta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size_delta: Option<i64>,
}

impl PolicyAdjustment {
    pub fn sample_size(delta: i64) -> Self {
        Self {
            cadence_delta: None,
            sample_size_delta: Some(delta),
        }
    }

    pub fn cadence(delta: i64) -> Self {
        Self {
            cadence_delta: Some(delta),
            sample_size_delta: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cadence_delta.is_none() && self.sample_size_delta.is_none()
    }
}

/// The evaluator's verdict for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub verdict: Verdict,
    pub confidence: f64,
    pub reason_codes: Vec<ReasonCode>,
    pub suggested_adjustment: Option<PolicyAdjustment>,
}

impl Decision {
    pub fn is_confirmed(&self) -> bool {
        self.verdict == Verdict::Confirm
    }

    /// Reason codes joined with `;`.
    pub fn reason(&self) -> String {
        self.reason_codes
            .iter()
            .map(ReasonCode::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn has_reason(&self, code: ReasonCode) -> bool {
        self.reason_codes.contains(&code)
    }
}

/// One cycle's sampling plan. Never mutated; the next cycle gets a new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub plan_id: String,
    pub keyword: String,
    pub since: Option<DateTime<Utc>>,
    pub sample_limit: u32,
    pub cadence_seconds: u64,
    pub sensitivity: f64,
    pub filters: Filters,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn cadence(&self) -> Duration {
        Duration::from_secs(self.cadence_seconds)
    }
}

/// Control loop states, in cycle order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopState {
    Planning,
    Fetching,
    Scoring,
    Aggregating,
    Evaluating,
    Adjusting,
    Sleeping,
    Stopped,
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoopState::Planning => "PLANNING",
            LoopState::Fetching => "FETCHING",
            LoopState::Scoring => "SCORING",
            LoopState::Aggregating => "AGGREGATING",
            LoopState::Evaluating => "EVALUATING",
            LoopState::Adjusting => "ADJUSTING",
            LoopState::Sleeping => "SLEEPING",
            LoopState::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}
