//! Offer-of-help marker requirement for longer answers.

use super::OUTPUT_SCOPE;
use crate::guardrail::{
    CheckContext, CheckDescriptor, CheckError, GuardrailCheck, GuardrailConfig, GuardrailPhase,
    GuardrailVerdict, Severity,
};
use crate::intent::{IntentCategory, IntentClassifier, normalize};
use std::sync::Arc;

const HELP_MARKERS: [&str; 12] = [
    "i can help",
    "i can assist",
    "i'm here to help",
    "i can provide",
    "i can explain",
    "i can show",
    "let me help",
    "i'll help",
    "i can do",
    "here is",
    "here are",
    "here's",
];

/// Requires longer answers to stay framed as assistance.
///
/// Conversational replies (greetings) and short answers are exempt.
pub struct OutputScopeCheck {
    descriptor: CheckDescriptor,
    classifier: Arc<IntentClassifier>,
    min_words: usize,
}

impl OutputScopeCheck {
    /// Builds the check from configuration.
    #[must_use]
    pub fn new(config: &GuardrailConfig, classifier: Arc<IntentClassifier>) -> Self {
        Self {
            descriptor: CheckDescriptor::new(OUTPUT_SCOPE, GuardrailPhase::Output, Severity::Low)
                .with_priority(30)
                .intelligent()
                .disabled_by_default(),
            classifier,
            min_words: config.scope_min_words,
        }
    }
}

impl GuardrailCheck for OutputScopeCheck {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn evaluate(&self, text: &str, _context: &CheckContext) -> Result<GuardrailVerdict, CheckError> {
        if self.classifier.classify(text).category() == IntentCategory::Conversational {
            return Ok(GuardrailVerdict::pass(
                OUTPUT_SCOPE,
                "Conversational response is exempt",
            ));
        }

        let normalized = normalize(text);
        if let Some(marker) = HELP_MARKERS
            .iter()
            .find(|marker| normalized.contains(*marker))
        {
            return Ok(
                GuardrailVerdict::pass(OUTPUT_SCOPE, "Response offers assistance")
                    .with_metadata("marker", *marker),
            );
        }

        let words = normalized.split_whitespace().count();
        if words <= self.min_words {
            return Ok(GuardrailVerdict::pass(
                OUTPUT_SCOPE,
                "Short response is exempt",
            ));
        }

        Ok(GuardrailVerdict::fail(
            OUTPUT_SCOPE,
            self.descriptor.severity(),
            "Response lacks an offer of help or topical framing",
        )
        .with_metadata("words", words))
    }
}
