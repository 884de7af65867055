// src/core/planner.rs — Plan generation and policy adjustment

use chrono::Utc;

use super::policy::{PolicySnapshot, PolicyStore};
use super::types::{Decision, Plan, PolicyAdjustment};
use crate::infra::config::{PolicyConfig, SubjectConfig, MAX_CADENCE_SECS};
use crate::infra::errors::MonitorError;

/// Builds one plan per cycle and is the only writer of the policy store.
pub struct Planner {
    subject: SubjectConfig,
    limits: PolicyConfig,
}

/// Result of merging a decision's adjustment into the store.
#[derive(Debug)]
pub struct PolicyMerge {
    pub snapshot: PolicySnapshot,
    pub changed: bool,
    /// Fields skipped as malformed.
    pub rejected: Vec<MonitorError>,
}

impl Planner {
    pub fn new(subject: SubjectConfig, limits: PolicyConfig) -> Self {
        Self { subject, limits }
    }

    pub fn subject(&self) -> &SubjectConfig {
        &self.subject
    }

    /// Build a fresh plan from the policy snapshot. Feedback deltas are
    /// applied on top, floored so sampling never degenerates. Cadence never
    /// exceeds `MAX_CADENCE_SECS`.
    pub fn create_plan(
        &self,
        policy: &PolicySnapshot,
        feedback: Option<&PolicyAdjustment>,
    ) -> Plan {
        let mut cadence_seconds = policy.cadence_seconds.min(MAX_CADENCE_SECS);
        let mut sample_limit = policy.sample_limit;

        if let Some(adj) = feedback {
            cadence_seconds = apply_floored(
                cadence_seconds as i128,
                adj.cadence_delta.unwrap_or(0),
                self.limits.min_cadence_secs as i128,
                MAX_CADENCE_SECS as i128,
            ) as u64;
            sample_limit = apply_floored(
                sample_limit as i128,
                adj.sample_size_delta.unwrap_or(0),
                self.limits.min_sample_limit as i128,
                u32::MAX as i128,
            ) as u32;
        }

        let plan = Plan {
            plan_id: uuid::Uuid::new_v4().to_string(),
            keyword: self.subject.keyword.clone(),
            since: self.subject.since,
            sample_limit,
            cadence_seconds,
            sensitivity: policy.sensitivity,
            filters: self.subject.filters.clone(),
            created_at: Utc::now(),
        };

        tracing::debug!(
            subject = %plan.keyword,
            plan_id = %plan.plan_id,
            sample_limit = plan.sample_limit,
            cadence = plan.cadence_seconds,
            "Plan created",
        );
        plan
    }

    /// Merge the decision's suggested adjustment into the store. A decision
    /// without one leaves the store untouched.
    pub fn adjust_policy(&self, store: &mut PolicyStore, decision: &Decision) -> PolicyMerge {
        let Some(adjustment) = decision.suggested_adjustment.filter(|a| !a.is_empty()) else {
            return PolicyMerge {
                snapshot: store.snapshot(),
                changed: false,
                rejected: Vec::new(),
            };
        };

        let before = store.snapshot().revision;
        let rejected = store.merge(&adjustment);
        for err in &rejected {
            tracing::warn!(subject = %self.subject.keyword, "Skipping policy field: {}", err);
        }
        let snapshot = store.snapshot();

        PolicyMerge {
            changed: snapshot.revision != before,
            snapshot,
            rejected,
        }
    }
}

fn apply_floored(base: i128, delta: i64, floor: i128, ceil: i128) -> i128 {
    (base + delta as i128).max(floor).min(ceil)
}
