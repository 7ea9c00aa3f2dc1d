//! Static description of a check and the phases it runs in.

use super::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in a workflow run where a check applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailPhase {
    /// Runs on the request before routing.
    Input,
    /// Runs on the final result before it is returned.
    Output,
}

impl GuardrailPhase {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for GuardrailPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether guardrails apply to a call.
///
/// Bypassing is an explicit caller assertion (e.g. an administrative
/// caller); it is never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// Run every active check.
    #[default]
    Enforced,
    /// Skip the manager entirely.
    Bypassed,
}

impl Enforcement {
    /// Returns `true` when checks must be skipped.
    #[must_use]
    pub const fn is_bypassed(self) -> bool {
        matches!(self, Self::Bypassed)
    }
}

/// Registration metadata declared by every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDescriptor {
    name: String,
    phase: GuardrailPhase,
    severity: Severity,
    enabled_by_default: bool,
    priority: u16,
    intelligent: bool,
}

impl CheckDescriptor {
    /// Creates an enabled, pattern-based descriptor with priority 100.
    #[must_use]
    pub fn new(name: impl Into<String>, phase: GuardrailPhase, severity: Severity) -> Self {
        Self {
            name: name.into(),
            phase,
            severity,
            enabled_by_default: true,
            priority: 100,
            intelligent: false,
        }
    }

    /// Sets the priority; lower runs earlier.
    #[must_use]
    pub const fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the check as context-aware, ordering it before pattern checks
    /// of equal priority.
    #[must_use]
    pub const fn intelligent(mut self) -> Self {
        self.intelligent = true;
        self
    }

    /// Leaves the check off unless configuration enables it.
    #[must_use]
    pub const fn disabled_by_default(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }

    /// Unique check name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phase the check runs in.
    #[must_use]
    pub const fn phase(&self) -> GuardrailPhase {
        self.phase
    }

    /// Default severity of failing verdicts.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether the check is on without configuration.
    #[must_use]
    pub const fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    /// Default priority.
    #[must_use]
    pub const fn priority(&self) -> u16 {
        self.priority
    }

    /// Whether the check is context-aware.
    #[must_use]
    pub const fn is_intelligent(&self) -> bool {
        self.intelligent
    }
}
