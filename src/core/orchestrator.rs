// src/core/orchestrator.rs — Per-subject control loop
//
// PLANNING → FETCHING → SCORING → AGGREGATING → EVALUATING → ADJUSTING →
// SLEEPING → PLANNING. Shutdown is checked at every state boundary; once it
// is observed the policy store is never touched again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;

use super::events::MonitorEvent;
use super::planner::Planner;
use super::policy::{PolicySnapshot, PolicyStore, PolicyWatch};
use super::types::*;
use crate::evaluator::Evaluator;
use crate::infra::errors::MonitorError;
use crate::notify::{EventSink, TracingSink};
use crate::worker::Worker;

/// Summary returned when a loop stops.
#[derive(Debug, Clone, Serialize)]
pub struct LoopReport {
    pub subject: String,
    /// Cycles started, failed ones included.
    pub cycles: u64,
    pub alerts: u64,
    pub failed_cycles: u64,
    pub final_state: LoopState,
    pub policy: PolicySnapshot,
}

enum CycleOutcome {
    Completed { confirmed: bool },
    Cancelled,
}

/// One subject's monitoring loop. Owns its policy store; nothing is shared
/// with other loops.
pub struct ControlLoop {
    subject: String,
    planner: Planner,
    store: PolicyStore,
    worker: Worker,
    evaluator: Evaluator,
    sink: Arc<dyn EventSink>,
    max_cycles: Option<u64>,
    state: LoopState,
}

impl ControlLoop {
    pub fn new(planner: Planner, store: PolicyStore, worker: Worker, evaluator: Evaluator) -> Self {
        Self {
            subject: planner.subject().keyword.clone(),
            planner,
            store,
            worker,
            evaluator,
            sink: Arc::new(TracingSink),
            max_cycles: None,
            state: LoopState::Planning,
        }
    }

    /// Route events to `sink` instead of the default tracing sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Stop after `n` cycles. The last cycle skips its sleep.
    pub fn with_max_cycles(mut self, n: u64) -> Self {
        self.max_cycles = Some(n);
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Read-only policy handle for observers outside the loop.
    pub fn policy_watch(&self) -> PolicyWatch {
        self.store.subscribe()
    }

    pub fn policy(&self) -> PolicySnapshot {
        self.store.snapshot()
    }

    fn emit(&self, event: MonitorEvent) {
        self.sink.emit(&event);
    }

    fn transition(&mut self, next: LoopState) {
        tracing::trace!(subject = %self.subject, from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    /// Drive the loop until shutdown, `max_cycles`, or an unrecoverable error.
    /// Recoverable errors abort only the current cycle.
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<LoopReport, MonitorError> {
        let mut cycles = 0u64;
        let mut alerts = 0u64;
        let mut failed_cycles = 0u64;

        tracing::info!(subject = %self.subject, "Control loop started");

        loop {
            if is_cancelled(&shutdown) {
                break;
            }

            self.transition(LoopState::Planning);
            let policy = self.store.snapshot();
            let plan = self.planner.create_plan(&policy, policy.feedback().as_ref());
            cycles += 1;
            self.emit(MonitorEvent::cycle_started(&self.subject, cycles, &plan));

            match self.run_cycle(cycles, &plan, &shutdown).await {
                Ok(CycleOutcome::Completed { confirmed }) => {
                    if confirmed {
                        alerts += 1;
                    }
                }
                Ok(CycleOutcome::Cancelled) => break,
                Err(e) => {
                    tracing::warn!(
                        subject = %self.subject,
                        cycle = cycles,
                        state = %self.state,
                        "Cycle failed: {}",
                        e
                    );
                    self.emit(MonitorEvent::error_occurred(
                        &self.subject,
                        cycles,
                        self.state,
                        &e,
                    ));
                    if !e.is_cycle_recoverable() {
                        self.transition(LoopState::Stopped);
                        return Err(e);
                    }
                    failed_cycles += 1;
                }
            }

            if self.max_cycles.is_some_and(|max| cycles >= max) || is_cancelled(&shutdown) {
                break;
            }

            self.transition(LoopState::Sleeping);
            if !sleep_or_shutdown(plan.cadence(), &mut shutdown).await {
                break;
            }
        }

        self.transition(LoopState::Stopped);
        tracing::info!(
            subject = %self.subject,
            cycles,
            alerts,
            failed_cycles,
            "Control loop stopped"
        );

        Ok(LoopReport {
            subject: self.subject.clone(),
            cycles,
            alerts,
            failed_cycles,
            final_state: self.state,
            policy: self.store.snapshot(),
        })
    }

    async fn run_cycle(
        &mut self,
        cycle: u64,
        plan: &Plan,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<CycleOutcome, MonitorError> {
        if is_cancelled(shutdown) {
            return Ok(CycleOutcome::Cancelled);
        }
        self.transition(LoopState::Fetching);
        let items = self.worker.fetch(plan).await?;
        let items = self.worker.clean(items);

        if is_cancelled(shutdown) {
            return Ok(CycleOutcome::Cancelled);
        }
        self.transition(LoopState::Scoring);
        let items = self.worker.score(items).await?;

        if is_cancelled(shutdown) {
            return Ok(CycleOutcome::Cancelled);
        }
        self.transition(LoopState::Aggregating);
        let output = self.worker.aggregate(&items);

        if is_cancelled(shutdown) {
            return Ok(CycleOutcome::Cancelled);
        }
        self.transition(LoopState::Evaluating);
        let decision = self
            .evaluator
            .evaluate_candidate(&output.signal, &output.evidence);
        tracing::info!(
            subject = %self.subject,
            cycle,
            plan_id = %plan.plan_id,
            samples = output.signal.sample_count,
            z = output.signal.z_score,
            neg = output.signal.negative_fraction,
            verdict = %decision.verdict,
            confidence = decision.confidence,
            reason = %decision.reason(),
            "Decision rendered"
        );
        self.emit(MonitorEvent::decision_rendered(
            &self.subject,
            cycle,
            plan,
            &output.signal,
            &decision,
        ));

        let confirmed = decision.is_confirmed();
        if confirmed {
            let summary = self.evaluator.summarize_evidence(&output.evidence);
            self.emit(MonitorEvent::alert_confirmed(
                &self.subject,
                cycle,
                plan,
                &output.signal,
                &decision,
                &summary,
            ));
        }

        if is_cancelled(shutdown) {
            return Ok(CycleOutcome::Cancelled);
        }
        self.transition(LoopState::Adjusting);
        let merge = self.planner.adjust_policy(&mut self.store, &decision);
        for err in &merge.rejected {
            self.emit(MonitorEvent::error_occurred(
                &self.subject,
                cycle,
                LoopState::Adjusting,
                err,
            ));
        }
        if merge.changed {
            self.emit(MonitorEvent::policy_adjusted(
                &self.subject,
                cycle,
                &merge.snapshot,
            ));
        }

        Ok(CycleOutcome::Completed { confirmed })
    }
}

fn is_cancelled(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

/// Sleep for `duration` unless shutdown is signalled first. Returns `false`
/// on shutdown. A dropped sender can no longer signal, so the full sleep is
/// served. A duration past the clock's range only ends on shutdown.
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let deadline = Instant::now().checked_add(duration);
    loop {
        tokio::select! {
            _ = sleep_until_opt(deadline) => return true,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    sleep_until_opt(deadline).await;
                    return true;
                }
                if *shutdown.borrow() {
                    return false;
                }
            }
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
