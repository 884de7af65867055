// src/infra/errors.rs — Error types for pulsewatch

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    // Collaborator errors (cycle aborts, loop retries at the next tick)
    #[error("Data source '{source_name}' unavailable: {message}")]
    FetchUnavailable {
        source_name: String,
        message: String,
    },

    #[error("Classifier '{classifier}' unavailable: {message}")]
    ClassifierUnavailable {
        classifier: String,
        message: String,
    },

    // Plan errors (fatal to the cycle only)
    #[error("Invalid plan {plan_id}: {reason}")]
    InvalidPlan { plan_id: String, reason: String },

    // Policy errors (the faulty field is skipped, the merge continues)
    #[error("Malformed policy delta for '{field}': {value} ({reason})")]
    PolicyCorruption {
        field: String,
        value: i64,
        reason: String,
    },

    #[error("Notification delivery failed: {0}")]
    Notify(String),

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MonitorError {
    /// Errors that only abort the current cycle. Anything else stops the loop.
    pub fn is_cycle_recoverable(&self) -> bool {
        matches!(
            self,
            MonitorError::FetchUnavailable { .. }
                | MonitorError::ClassifierUnavailable { .. }
                | MonitorError::InvalidPlan { .. }
                | MonitorError::PolicyCorruption { .. }
                | MonitorError::Notify(_)
        )
    }

    /// Short machine-readable tag used in event payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorError::FetchUnavailable { .. } => "fetch_unavailable",
            MonitorError::ClassifierUnavailable { .. } => "classifier_unavailable",
            MonitorError::InvalidPlan { .. } => "invalid_plan",
            MonitorError::PolicyCorruption { .. } => "policy_corruption",
            MonitorError::Notify(_) => "notify",
            MonitorError::Config(_) => "config",
            MonitorError::Io(_) => "io",
            MonitorError::Other(_) => "other",
        }
    }
}
