// src/core/policy.rs — Per-subject policy store
//
// The store is owned by its control loop. Only the planner mutates it (the
// merge method is crate-private); every other reader gets an immutable
// snapshot, either directly or through a watch handle.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::types::PolicyAdjustment;
use crate::infra::config::{PolicyConfig, SubjectConfig};
use crate::infra::errors::MonitorError;

/// Immutable view of the policy at one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub cadence_seconds: u64,
    pub sensitivity: f64,
    pub sample_limit: u32,
    /// Accumulated adjustment deltas, last write wins per field.
    pub deltas: PolicyAdjustment,
    pub revision: u64,
}

impl PolicySnapshot {
    /// Deltas to feed into the next plan, if any were recorded.
    pub fn feedback(&self) -> Option<PolicyAdjustment> {
        (!self.deltas.is_empty()).then_some(self.deltas)
    }
}

pub struct PolicyStore {
    current: PolicySnapshot,
    limits: PolicyConfig,
    tx: watch::Sender<PolicySnapshot>,
}

impl PolicyStore {
    pub fn new(
        cadence_seconds: u64,
        sensitivity: f64,
        sample_limit: u32,
        limits: PolicyConfig,
    ) -> Self {
        let current = PolicySnapshot {
            cadence_seconds,
            sensitivity,
            sample_limit,
            deltas: PolicyAdjustment::default(),
            revision: 0,
        };
        let (tx, _rx) = watch::channel(current.clone());
        Self {
            current,
            limits,
            tx,
        }
    }

    pub fn from_subject(subject: &SubjectConfig, limits: PolicyConfig) -> Self {
        Self::new(
            subject.cadence,
            subject.sensitivity,
            subject.sample_size,
            limits,
        )
    }

    pub fn snapshot(&self) -> PolicySnapshot {
        self.current.clone()
    }

    /// Read-only handle for observers outside the loop (UI, status).
    pub fn subscribe(&self) -> PolicyWatch {
        PolicyWatch {
            rx: self.tx.subscribe(),
        }
    }

    /// Merge deltas field by field. Malformed fields are skipped and returned
    /// as `PolicyCorruption` errors; valid fields are still applied.
    pub(crate) fn merge(&mut self, adjustment: &PolicyAdjustment) -> Vec<MonitorError> {
        let mut rejected = Vec::new();
        let mut next = self.current.deltas;

        if let Some(delta) = adjustment.cadence_delta {
            match self.check_delta("cadence_delta", delta) {
                Ok(()) => next.cadence_delta = Some(delta),
                Err(e) => rejected.push(e),
            }
        }
        if let Some(delta) = adjustment.sample_size_delta {
            match self.check_delta("sample_size_delta", delta) {
                Ok(()) => next.sample_size_delta = Some(delta),
                Err(e) => rejected.push(e),
            }
        }

        if next != self.current.deltas {
            self.current.deltas = next;
            self.current.revision += 1;
            self.tx.send_replace(self.current.clone());
        }
        rejected
    }

    fn check_delta(&self, field: &str, delta: i64) -> Result<(), MonitorError> {
        let max = self.limits.max_abs_delta;
        if delta.checked_abs().is_none_or(|abs| abs > max) {
            return Err(MonitorError::PolicyCorruption {
                field: field.to_string(),
                value: delta,
                reason: format!("magnitude exceeds {max}"),
            });
        }
        Ok(())
    }
}

/// Read-only policy observer.
#[derive(Clone)]
pub struct PolicyWatch {
    rx: watch::Receiver<PolicySnapshot>,
}

impl PolicyWatch {
    pub fn snapshot(&self) -> PolicySnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next revision. Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PolicyStore {
        PolicyStore::new(60, 0.8, 200, PolicyConfig::default())
    }

    #[test]
    fn test_new_store_has_no_deltas() {
        let s = store();
        let snap = s.snapshot();
        assert_eq!(snap.cadence_seconds, 60);
        assert_eq!(snap.sample_limit, 200);
        assert_eq!(snap.revision, 0);
        assert!(snap.feedback().is_none());
    }

    #[test]
    fn test_merge_last_write_wins_per_field() {
        let mut s = store();
        assert!(s.merge(&PolicyAdjustment::sample_size(50)).is_empty());
        assert!(s.merge(&PolicyAdjustment::cadence(-20)).is_empty());
        assert!(s.merge(&PolicyAdjustment::sample_size(30)).is_empty());

        let deltas = s.snapshot().deltas;
        assert_eq!(deltas.sample_size_delta, Some(30));
        assert_eq!(deltas.cadence_delta, Some(-20));
        assert_eq!(s.snapshot().revision, 3);
    }

    #[test]
    fn test_merge_skips_corrupt_field_and_keeps_the_rest() {
        let mut s = store();
        let adj = PolicyAdjustment {
            cadence_delta: Some(1_000_000),
            sample_size_delta: Some(50),
        };
        let rejected = s.merge(&adj);
        assert_eq!(rejected.len(), 1);
        assert!(matches!(
            &rejected[0],
            MonitorError::PolicyCorruption { field, .. } if field == "cadence_delta"
        ));
        let deltas = s.snapshot().deltas;
        assert!(deltas.cadence_delta.is_none());
        assert_eq!(deltas.sample_size_delta, Some(50));
    }

    #[test]
    fn test_merge_rejects_i64_min() {
        let mut s = store();
        let rejected = s.merge(&PolicyAdjustment::sample_size(i64::MIN));
        assert_eq!(rejected.len(), 1);
        assert_eq!(s.snapshot().revision, 0);
    }

    #[test]
    fn test_identical_merge_does_not_bump_revision() {
        let mut s = store();
        s.merge(&PolicyAdjustment::sample_size(50));
        s.merge(&PolicyAdjustment::sample_size(50));
        assert_eq!(s.snapshot().revision, 1);
    }

    #[tokio::test]
    async fn test_watch_wakes_on_revision_and_ends_with_store() {
        let mut s = store();
        let mut watch = s.subscribe();
        let waiter = tokio::spawn(async move {
            let woke = watch.changed().await;
            (woke, watch.snapshot().revision, watch)
        });
        tokio::task::yield_now().await;
        s.merge(&PolicyAdjustment::cadence(30));
        let (woke, revision, mut watch) = waiter.await.unwrap();
        assert!(woke);
        assert_eq!(revision, 1);

        drop(s);
        assert!(!watch.changed().await);
    }

    #[test]
    fn test_watch_sees_merges() {
        let mut s = store();
        let watch = s.subscribe();
        s.merge(&PolicyAdjustment::sample_size(50));
        assert_eq!(watch.snapshot().deltas.sample_size_delta, Some(50));
    }
}
