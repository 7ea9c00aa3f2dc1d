//! Output length bound and secret-like token detection.

use super::{OUTPUT_SAFETY, patterns::PatternSet};
use crate::guardrail::{
    CheckContext, CheckDescriptor, CheckError, GuardrailCheck, GuardrailConfig, GuardrailError,
    GuardrailPhase, GuardrailVerdict, Severity,
};

const SENSITIVE_PATTERNS: [(&str, &str); 13] = [
    ("script tag", r"<script[^>]*>"),
    ("javascript uri", r"javascript\s*:"),
    ("password assignment", r"\bpassword\s*[=:]\s*\S+"),
    ("api key assignment", r"\bapi[_ -]?key\s*[=:]\s*\S+"),
    ("secret assignment", r"\b(secret|token)\s*[=:]\s*\S{8,}"),
    ("openai-style key", r"\bsk-[a-z0-9_-]{16,}"),
    ("github token", r"\bghp_[a-z0-9]{20,}"),
    ("github fine-grained token", r"\bgithub_pat_[a-z0-9_]{20,}"),
    ("gitlab token", r"\bglpat-[a-z0-9_-]{16,}"),
    ("slack token", r"\bxox[abps]-[a-z0-9-]{10,}"),
    ("aws access key", r"\bakia[0-9a-z]{16}\b"),
    (
        "json web token",
        r"\beyj[a-z0-9_-]{10,}\.[a-z0-9_-]{10,}\.[a-z0-9_-]{10,}",
    ),
    (
        "private key block",
        r"-----begin (rsa |ec |openssh |dsa )?private key-----",
    ),
];

/// Fails on oversized output or output echoing secret-like tokens.
pub struct OutputSafetyCheck {
    descriptor: CheckDescriptor,
    patterns: PatternSet,
    max_length: usize,
}

impl OutputSafetyCheck {
    /// Builds the check from the built-in list plus configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::InvalidPattern`] when a configured pattern
    /// fails to compile.
    pub fn new(config: &GuardrailConfig) -> Result<Self, GuardrailError> {
        let extra = config
            .sensitive_patterns
            .iter()
            .map(|pattern| (pattern.as_str(), pattern.as_str()));
        Ok(Self {
            descriptor: CheckDescriptor::new(OUTPUT_SAFETY, GuardrailPhase::Output, Severity::High)
                .with_priority(10),
            patterns: PatternSet::compile(OUTPUT_SAFETY, SENSITIVE_PATTERNS.into_iter().chain(extra))?,
            max_length: config.max_output_length,
        })
    }
}

impl GuardrailCheck for OutputSafetyCheck {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn evaluate(&self, text: &str, _context: &CheckContext) -> Result<GuardrailVerdict, CheckError> {
        let length = text.chars().count();
        if length > self.max_length {
            return Ok(GuardrailVerdict::fail(
                OUTPUT_SAFETY,
                self.descriptor.severity(),
                format!(
                    "Output exceeds maximum length of {} characters",
                    self.max_length
                ),
            )
            .with_metadata("length", length));
        }
        Ok(match self.patterns.first_match(text) {
            Some(label) => GuardrailVerdict::fail(
                OUTPUT_SAFETY,
                self.descriptor.severity(),
                format!("Output contains sensitive content: {label}"),
            )
            .with_metadata("pattern", label),
            None => GuardrailVerdict::pass(OUTPUT_SAFETY, "Output passed safety checks"),
        })
    }
}
