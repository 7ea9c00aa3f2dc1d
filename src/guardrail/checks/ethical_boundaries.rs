//! Fixed harmful-intent phrase list.

use super::{ETHICAL_BOUNDARIES, patterns::PatternSet};
use crate::guardrail::{
    CheckContext, CheckDescriptor, CheckError, GuardrailCheck, GuardrailError, GuardrailPhase,
    GuardrailVerdict, Severity,
};

const HARMFUL_PHRASES: [&str; 9] = [
    "create a deepfake",
    "create deepfake",
    "generate fake news",
    "impersonate someone",
    "stalk someone",
    "dox",
    "swatting",
    "bomb threat",
    "harm others",
];

/// Rejects requests that ask for clearly harmful assistance.
pub struct EthicalBoundariesCheck {
    descriptor: CheckDescriptor,
    phrases: PatternSet,
}

impl EthicalBoundariesCheck {
    /// Compiles the phrase list.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::InvalidPattern`] if a phrase cannot be
    /// compiled.
    pub fn new() -> Result<Self, GuardrailError> {
        Ok(Self {
            descriptor: CheckDescriptor::new(
                ETHICAL_BOUNDARIES,
                GuardrailPhase::Input,
                Severity::High,
            )
            .with_priority(40),
            phrases: PatternSet::phrases(ETHICAL_BOUNDARIES, HARMFUL_PHRASES)?,
        })
    }
}

impl GuardrailCheck for EthicalBoundariesCheck {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn evaluate(&self, text: &str, _context: &CheckContext) -> Result<GuardrailVerdict, CheckError> {
        Ok(match self.phrases.first_match(text) {
            Some(phrase) => GuardrailVerdict::fail(
                ETHICAL_BOUNDARIES,
                self.descriptor.severity(),
                format!("Request conflicts with ethical boundaries: {phrase}"),
            )
            .with_metadata("phrase", phrase),
            None => GuardrailVerdict::pass(ETHICAL_BOUNDARIES, "Within ethical boundaries"),
        })
    }
}
