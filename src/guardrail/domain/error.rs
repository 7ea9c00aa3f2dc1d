//! Error types for guardrail construction and evaluation.

use crate::intent::IntentRuleError;
use thiserror::Error;

/// Error raised by a check that could not produce a verdict.
///
/// The manager turns these into critical failing verdicts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CheckError {
    message: String,
}

impl CheckError {
    /// Creates an evaluation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors returned while building or reconfiguring a guardrail manager.
#[derive(Debug, Clone, Error)]
pub enum GuardrailError {
    /// A configured or built-in pattern failed to compile.
    #[error("invalid pattern for check '{check}': {source}")]
    InvalidPattern {
        /// Check owning the pattern.
        check: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The intent rule table failed to compile.
    #[error(transparent)]
    Intent(#[from] IntentRuleError),

    /// A threshold lies outside `[0, 1]`.
    #[error("threshold '{name}' must be within [0, 1], got {value}")]
    InvalidThreshold {
        /// Setting name.
        name: String,
        /// Rejected value.
        value: f64,
    },

    /// No registered check has the given name.
    #[error("unknown guardrail check: {0}")]
    UnknownCheck(String),

    /// A check with the same name is already registered.
    #[error("duplicate guardrail check: {0}")]
    DuplicateCheck(String),
}

/// Error returned when parsing an unknown severity label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(pub String);
