//! Verdicts produced by guardrail checks.

use super::ParseSeverityError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// How serious a failing verdict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Worth surfacing.
    Medium,
    /// Must be blocked.
    High,
    /// Must be blocked and investigated.
    Critical,
}

impl Severity {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Severity {
    type Error = ParseSeverityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseSeverityError(value.to_owned())),
        }
    }
}

/// Outcome of one check invocation.
///
/// Verdicts are never mutated once returned by the manager; they are only
/// collected and reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    check: String,
    passed: bool,
    severity: Severity,
    reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    metadata: Map<String, Value>,
}

impl GuardrailVerdict {
    /// Creates a passing verdict.
    #[must_use]
    pub fn pass(check: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            passed: true,
            severity: Severity::Low,
            reason: reason.into(),
            score: None,
            metadata: Map::new(),
        }
    }

    /// Creates a failing verdict.
    #[must_use]
    pub fn fail(check: impl Into<String>, severity: Severity, reason: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            passed: false,
            severity,
            reason: reason.into(),
            score: None,
            metadata: Map::new(),
        }
    }

    /// Attaches a heuristic score.
    #[must_use]
    pub const fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Attaches one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replaces the severity of a failing verdict. Passing verdicts keep
    /// their severity.
    #[must_use]
    pub const fn with_failure_severity(mut self, severity: Severity) -> Self {
        if !self.passed {
            self.severity = severity;
        }
        self
    }

    /// Name of the check that produced the verdict.
    #[must_use]
    pub fn check(&self) -> &str {
        &self.check
    }

    /// Returns `true` when the check passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Returns the severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Human-readable explanation.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Heuristic score, for checks that compute one.
    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        self.score
    }

    /// Structured metadata such as detected intent or matched pattern.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}
