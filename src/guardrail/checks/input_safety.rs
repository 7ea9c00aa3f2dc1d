//! Intent-aware input safety check.

use super::{INPUT_SAFETY, patterns::PatternSet};
use crate::guardrail::{
    CheckContext, CheckDescriptor, CheckError, GuardrailCheck, GuardrailConfig, GuardrailError,
    GuardrailPhase, GuardrailVerdict, Severity,
};
use crate::intent::{IntentCategory, IntentClassifier};
use std::sync::Arc;

const MARKUP_PATTERNS: [(&str, &str); 3] = [
    ("script tag", r"<script[^>]*>"),
    ("javascript uri", r"javascript\s*:"),
    ("data uri", r"\bdata:[a-z]+/[a-z0-9.+-]+;base64,"),
];

/// Blocks oversized, malformed, or dangerous-intent requests.
///
/// Dangerous means destructive, code-execution or system-modification
/// intent at or above the configured confidence threshold. A safe-context
/// override in the classifier lets benign lookups through.
pub struct InputSafetyCheck {
    descriptor: CheckDescriptor,
    classifier: Arc<IntentClassifier>,
    markup: PatternSet,
    max_length: usize,
    threshold: f64,
}

impl InputSafetyCheck {
    /// Builds the check from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::InvalidPattern`] if the markup patterns
    /// fail to compile.
    pub fn new(
        config: &GuardrailConfig,
        classifier: Arc<IntentClassifier>,
    ) -> Result<Self, GuardrailError> {
        Ok(Self {
            descriptor: CheckDescriptor::new(INPUT_SAFETY, GuardrailPhase::Input, Severity::High)
                .with_priority(10)
                .intelligent(),
            classifier,
            markup: PatternSet::compile(INPUT_SAFETY, MARKUP_PATTERNS)?,
            max_length: config.max_input_length,
            threshold: config.threshold_for(INPUT_SAFETY, config.intent_block_threshold),
        })
    }

    fn structural_violation(&self, text: &str) -> Option<GuardrailVerdict> {
        let length = text.chars().count();
        let severity = self.descriptor.severity();
        if text.trim().is_empty() {
            return Some(GuardrailVerdict::fail(
                INPUT_SAFETY,
                severity,
                "Input is empty",
            ));
        }
        if length > self.max_length {
            return Some(
                GuardrailVerdict::fail(
                    INPUT_SAFETY,
                    severity,
                    format!(
                        "Input exceeds maximum length of {} characters",
                        self.max_length
                    ),
                )
                .with_metadata("length", length),
            );
        }
        if text.chars().any(|c| c.is_control() && !c.is_whitespace()) {
            return Some(GuardrailVerdict::fail(
                INPUT_SAFETY,
                severity,
                "Input contains control characters",
            ));
        }
        self.markup.first_match(text).map(|label| {
            GuardrailVerdict::fail(
                INPUT_SAFETY,
                severity,
                format!("Input contains potentially harmful markup: {label}"),
            )
            .with_metadata("pattern", label)
        })
    }
}

impl GuardrailCheck for InputSafetyCheck {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn evaluate(&self, text: &str, _context: &CheckContext) -> Result<GuardrailVerdict, CheckError> {
        if let Some(violation) = self.structural_violation(text) {
            return Ok(violation);
        }

        let intent = self.classifier.classify(text);
        let category = intent.category();
        let blocked = category.is_dangerous() && intent.confidence() >= self.threshold;

        let base = if blocked {
            let severity = if category == IntentCategory::DestructiveAction {
                Severity::Critical
            } else {
                self.descriptor.severity()
            };
            GuardrailVerdict::fail(
                INPUT_SAFETY,
                severity,
                format!(
                    "Blocked {category} request (confidence {:.2})",
                    intent.confidence()
                ),
            )
        } else {
            GuardrailVerdict::pass(INPUT_SAFETY, "Input passed safety checks")
        };

        let verdict = base
            .with_metadata("intent", category.as_str())
            .with_metadata("confidence", intent.confidence())
            .with_metadata("rule", intent.rule_id().unwrap_or("none"));
        Ok(match intent.overridden_from() {
            Some(original) => verdict.with_metadata("overridden_from", original.as_str()),
            None => verdict,
        })
    }
}
