// src/cli/progress.rs — Terminal progress renderer for loop events

use crate::core::events::{EventType, MonitorEvent};
use crate::notify::EventSink;

/// Writes one line per event to stderr so stdout stays clean for reports.
pub struct TerminalProgress;

impl EventSink for TerminalProgress {
    fn emit(&self, event: &MonitorEvent) {
        eprintln!("{}", format_event(event));
    }
}

/// Render an event as a single terminal line.
pub fn format_event(event: &MonitorEvent) -> String {
    let p = &event.payload;
    let tag = format!("[{} #{}]", event.subject, event.cycle);
    match event.event_type {
        EventType::CycleStarted => format!(
            "{} sampling {} item(s), next in {}s",
            tag, p["sample_limit"], p["cadence_seconds"],
        ),
        EventType::DecisionRendered => {
            let d = &p["decision"];
            let s = &p["signal"];
            format!(
                "{} {} conf={:.2} n={} z={:.2} neg={:.2} ({})",
                tag,
                d["verdict"].as_str().unwrap_or("?"),
                d["confidence"].as_f64().unwrap_or(0.0),
                s["sample_count"],
                s["z_score"].as_f64().unwrap_or(0.0),
                s["negative_fraction"].as_f64().unwrap_or(0.0),
                reasons(&d["reason_codes"]),
            )
        }
        EventType::AlertConfirmed => format!(
            "{} ALERT '{}' conf={:.2}",
            tag,
            p["keyword"].as_str().unwrap_or(""),
            p["confidence"].as_f64().unwrap_or(0.0),
        ),
        EventType::ErrorOccurred => format!(
            "{} error in {}: {}",
            tag,
            p["state"].as_str().unwrap_or("?"),
            p["message"].as_str().unwrap_or(""),
        ),
        EventType::PolicyAdjusted => {
            let d = &p["policy"]["deltas"];
            format!(
                "{} policy rev {}: cadence {:+} sample {:+}",
                tag,
                p["policy"]["revision"],
                d["cadence_delta"].as_i64().unwrap_or(0),
                d["sample_size_delta"].as_i64().unwrap_or(0),
            )
        }
    }
}

fn reasons(codes: &serde_json::Value) -> String {
    codes
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(";")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::PolicySnapshot;
    use crate::core::types::*;
    use crate::infra::errors::MonitorError;
    use chrono::Utc;

    fn plan() -> Plan {
        Plan {
            plan_id: "p1".into(),
            keyword: "acme".into(),
            since: None,
            sample_limit: 200,
            cadence_seconds: 60,
            sensitivity: 0.8,
            filters: Default::default(),
            created_at: Utc::now(),
        }
    }

    fn signal() -> Signal {
        Signal {
            sample_count: 40,
            negative_fraction: 0.75,
            mean_score: -0.6,
            z_score: 3.0,
        }
    }

    fn confirm() -> Decision {
        Decision {
            verdict: Verdict::Confirm,
            confidence: 0.99,
            reason_codes: vec![ReasonCode::HighZAndNeg],
            suggested_adjustment: None,
        }
    }

    #[test]
    fn test_cycle_started_format() {
        let line = format_event(&MonitorEvent::cycle_started("acme", 1, &plan()));
        assert_eq!(line, "[acme #1] sampling 200 item(s), next in 60s");
    }

    #[test]
    fn test_decision_format() {
        let line = format_event(&MonitorEvent::decision_rendered(
            "acme",
            2,
            &plan(),
            &signal(),
            &confirm(),
        ));
        assert_eq!(
            line,
            "[acme #2] CONFIRM conf=0.99 n=40 z=3.00 neg=0.75 (high_z_and_neg)"
        );
    }

    #[test]
    fn test_alert_format() {
        let line = format_event(&MonitorEvent::alert_confirmed(
            "acme",
            3,
            &plan(),
            &signal(),
            &confirm(),
            "bad\n---\nworse",
        ));
        assert_eq!(line, "[acme #3] ALERT 'acme' conf=0.99");
    }

    #[test]
    fn test_error_format() {
        let err = MonitorError::FetchUnavailable {
            source_name: "http".into(),
            message: "connection refused".into(),
        };
        let line = format_event(&MonitorEvent::error_occurred(
            "acme",
            4,
            LoopState::Fetching,
            &err,
        ));
        assert_eq!(
            line,
            "[acme #4] error in FETCHING: Data source 'http' unavailable: connection refused"
        );
    }

    #[test]
    fn test_policy_format() {
        let snapshot = PolicySnapshot {
            cadence_seconds: 60,
            sensitivity: 0.8,
            sample_limit: 200,
            deltas: PolicyAdjustment::sample_size(50),
            revision: 1,
        };
        let line = format_event(&MonitorEvent::policy_adjusted("acme", 5, &snapshot));
        assert_eq!(line, "[acme #5] policy rev 1: cadence +0 sample +50");
    }
}
