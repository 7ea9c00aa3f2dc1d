//! Terminal failure kinds recorded on a workflow run.

use crate::guardrail::{GuardrailPhase, GuardrailVerdict, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a run ended without a trustworthy result.
///
/// Refusals are not failures: they end the run with an apology result.
/// Worker failures live on the task and in the assembled result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowFailure {
    /// A guardrail rejected the request or the result.
    #[error("{phase} guardrail '{check}' rejected the text ({severity}): {reason}")]
    ValidationFailure {
        /// Phase that failed.
        phase: GuardrailPhase,
        /// Failing check.
        check: String,
        /// Verdict severity.
        severity: Severity,
        /// Verdict reason.
        reason: String,
    },

    /// The oracle's reply could not be turned into a decision.
    #[error("routing failed: {detail}")]
    RoutingParseFailure {
        /// Last parse or oracle error.
        detail: String,
    },

    /// The oracle named a worker that is not registered.
    #[error("unknown worker: {name}")]
    UnknownWorker {
        /// Name as given by the oracle.
        name: String,
    },

    /// The run exceeded its iteration budget.
    #[error("iteration limit of {limit} reached")]
    IterationLimit {
        /// Configured maximum.
        limit: u32,
    },
}

impl WorkflowFailure {
    /// Builds a validation failure from a failing verdict.
    #[must_use]
    pub fn from_verdict(phase: GuardrailPhase, verdict: &GuardrailVerdict) -> Self {
        Self::ValidationFailure {
            phase,
            check: verdict.check().to_owned(),
            severity: verdict.severity(),
            reason: verdict.reason().to_owned(),
        }
    }

    /// Stable label of the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ValidationFailure { .. } => "validation_failure",
            Self::RoutingParseFailure { .. } => "routing_parse_failure",
            Self::UnknownWorker { .. } => "unknown_worker",
            Self::IterationLimit { .. } => "iteration_limit",
        }
    }
}
