// src/core/events.rs — Structured event stream emitted by the control loop

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::policy::PolicySnapshot;
use super::types::{Decision, LoopState, Plan, Signal};
use crate::infra::errors::MonitorError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CycleStarted,
    DecisionRendered,
    AlertConfirmed,
    ErrorOccurred,
    PolicyAdjusted,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CycleStarted => "cycle_started",
            Self::DecisionRendered => "decision_rendered",
            Self::AlertConfirmed => "alert_confirmed",
            Self::ErrorOccurred => "error_occurred",
            Self::PolicyAdjusted => "policy_adjusted",
        }
    }
}

/// `{eventType, timestamp, payload}` record handed to notification sinks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorEvent {
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    pub cycle: u64,
    pub payload: serde_json::Value,
}

impl MonitorEvent {
    fn new(event_type: EventType, subject: &str, cycle: u64, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            subject: subject.to_string(),
            cycle,
            payload,
        }
    }

    pub fn cycle_started(subject: &str, cycle: u64, plan: &Plan) -> Self {
        Self::new(
            EventType::CycleStarted,
            subject,
            cycle,
            serde_json::json!({
                "plan_id": plan.plan_id,
                "sample_limit": plan.sample_limit,
                "cadence_seconds": plan.cadence_seconds,
                "sensitivity": plan.sensitivity,
            }),
        )
    }

    pub fn decision_rendered(
        subject: &str,
        cycle: u64,
        plan: &Plan,
        signal: &Signal,
        decision: &Decision,
    ) -> Self {
        Self::new(
            EventType::DecisionRendered,
            subject,
            cycle,
            serde_json::json!({
                "plan_id": plan.plan_id,
                "signal": signal,
                "decision": decision,
            }),
        )
    }

    pub fn alert_confirmed(
        subject: &str,
        cycle: u64,
        plan: &Plan,
        signal: &Signal,
        decision: &Decision,
        summary: &str,
    ) -> Self {
        Self::new(
            EventType::AlertConfirmed,
            subject,
            cycle,
            serde_json::json!({
                "plan_id": plan.plan_id,
                "keyword": plan.keyword,
                "confidence": decision.confidence,
                "reason": decision.reason(),
                "signal": signal,
                "evidence_summary": summary,
            }),
        )
    }

    pub fn error_occurred(subject: &str, cycle: u64, state: LoopState, error: &MonitorError) -> Self {
        Self::new(
            EventType::ErrorOccurred,
            subject,
            cycle,
            serde_json::json!({
                "state": state,
                "kind": error.kind(),
                "message": error.to_string(),
                "recoverable": error.is_cycle_recoverable(),
            }),
        )
    }

    pub fn policy_adjusted(subject: &str, cycle: u64, policy: &PolicySnapshot) -> Self {
        Self::new(
            EventType::PolicyAdjusted,
            subject,
            cycle,
            serde_json::json!({ "policy": policy }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_serde_matches_as_str() {
        for t in [
            EventType::CycleStarted,
            EventType::DecisionRendered,
            EventType::AlertConfirmed,
            EventType::ErrorOccurred,
            EventType::PolicyAdjusted,
        ] {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_error_event_payload() {
        let err = MonitorError::FetchUnavailable {
            source_name: "http".into(),
            message: "connection refused".into(),
        };
        let ev = MonitorEvent::error_occurred("acme", 4, LoopState::Fetching, &err);
        assert_eq!(ev.event_type, EventType::ErrorOccurred);
        assert_eq!(ev.cycle, 4);
        assert_eq!(ev.payload["kind"], "fetch_unavailable");
        assert_eq!(ev.payload["state"], "FETCHING");
        assert_eq!(ev.payload["recoverable"], true);
    }
}
