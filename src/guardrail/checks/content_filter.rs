//! Configurable keyword denylist.

use super::{CONTENT_FILTER, patterns::PatternSet};
use crate::guardrail::{
    CheckContext, CheckDescriptor, CheckError, GuardrailCheck, GuardrailError, GuardrailPhase,
    GuardrailVerdict, Severity,
};

/// Rejects input containing any configured keyword as a whole word.
///
/// Disabled unless configuration turns it on.
pub struct ContentFilterCheck {
    descriptor: CheckDescriptor,
    keywords: PatternSet,
}

impl ContentFilterCheck {
    /// Compiles the keyword list.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::InvalidPattern`] if a keyword cannot be
    /// compiled.
    pub fn new(keywords: &[String]) -> Result<Self, GuardrailError> {
        Ok(Self {
            descriptor: CheckDescriptor::new(
                CONTENT_FILTER,
                GuardrailPhase::Input,
                Severity::Medium,
            )
            .with_priority(30)
            .disabled_by_default(),
            keywords: PatternSet::phrases(CONTENT_FILTER, keywords.iter().map(String::as_str))?,
        })
    }
}

impl GuardrailCheck for ContentFilterCheck {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn evaluate(&self, text: &str, _context: &CheckContext) -> Result<GuardrailVerdict, CheckError> {
        if self.keywords.is_empty() {
            return Ok(GuardrailVerdict::pass(
                CONTENT_FILTER,
                "No blocked keywords configured",
            ));
        }
        Ok(match self.keywords.first_match(text) {
            Some(keyword) => GuardrailVerdict::fail(
                CONTENT_FILTER,
                self.descriptor.severity(),
                format!("Blocked keyword detected: {keyword}"),
            )
            .with_metadata("keyword", keyword),
            None => GuardrailVerdict::pass(CONTENT_FILTER, "No blocked keywords found"),
        })
    }
}
