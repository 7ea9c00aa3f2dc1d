//! Intent categories and classification results.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse purpose of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// Asking what something is or how it works.
    Informational,
    /// Asking for stored data to be returned.
    DataRetrieval,
    /// Asking for comparison or evaluation.
    Analysis,
    /// Greetings and small talk.
    Conversational,
    /// Deleting, dropping, wiping or shutting things down.
    DestructiveAction,
    /// Changing settings, permissions or credentials.
    SystemModification,
    /// Running code or shell commands.
    CodeExecution,
    /// Asking for assistance.
    HelpRequest,
    /// Nothing matched.
    Other,
}

impl IntentCategory {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::DataRetrieval => "data_retrieval",
            Self::Analysis => "analysis",
            Self::Conversational => "conversational",
            Self::DestructiveAction => "destructive_action",
            Self::SystemModification => "system_modification",
            Self::CodeExecution => "code_execution",
            Self::HelpRequest => "help_request",
            Self::Other => "other",
        }
    }

    /// Returns `true` for categories guardrails may block.
    #[must_use]
    pub const fn is_dangerous(self) -> bool {
        matches!(
            self,
            Self::DestructiveAction | Self::SystemModification | Self::CodeExecution
        )
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for IntentCategory {
    type Error = ParseIntentError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "informational" => Ok(Self::Informational),
            "data_retrieval" => Ok(Self::DataRetrieval),
            "analysis" => Ok(Self::Analysis),
            "conversational" => Ok(Self::Conversational),
            "destructive_action" => Ok(Self::DestructiveAction),
            "system_modification" => Ok(Self::SystemModification),
            "code_execution" => Ok(Self::CodeExecution),
            "help_request" => Ok(Self::HelpRequest),
            "other" => Ok(Self::Other),
            _ => Err(ParseIntentError(value.to_owned())),
        }
    }
}

/// Result of classifying one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    category: IntentCategory,
    confidence: f64,
    rule_id: Option<String>,
    overridden_from: Option<IntentCategory>,
}

impl IntentClassification {
    pub(super) fn matched(category: IntentCategory, confidence: f64, rule_id: &str) -> Self {
        Self {
            category,
            confidence,
            rule_id: Some(rule_id.to_owned()),
            overridden_from: None,
        }
    }

    pub(super) const fn unmatched() -> Self {
        Self {
            category: IntentCategory::Other,
            confidence: 0.0,
            rule_id: None,
            overridden_from: None,
        }
    }

    pub(super) fn downgraded(
        self,
        category: IntentCategory,
        confidence: f64,
        rule_id: &str,
    ) -> Self {
        Self {
            category,
            confidence,
            rule_id: Some(rule_id.to_owned()),
            overridden_from: Some(self.category),
        }
    }

    /// Returns the winning category.
    #[must_use]
    pub const fn category(&self) -> IntentCategory {
        self.category
    }

    /// Returns the confidence in `[0, 1]`.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Returns the identifier of the rule that decided the category.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    /// Returns the dangerous category replaced by a safe-context rule.
    #[must_use]
    pub const fn overridden_from(&self) -> Option<IntentCategory> {
        self.overridden_from
    }
}

/// Error returned when parsing an unknown intent label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown intent category: {0}")]
pub struct ParseIntentError(pub String);

/// Error raised when a rule pattern fails to compile.
#[derive(Debug, Clone, Error)]
#[error("invalid pattern for rule '{rule_id}': {source}")]
pub struct IntentRuleError {
    /// Rule whose pattern is invalid.
    pub rule_id: String,
    /// Underlying regex error.
    #[source]
    pub source: regex::Error,
}
