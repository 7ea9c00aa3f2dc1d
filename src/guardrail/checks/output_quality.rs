//! Heuristic output quality score.

use super::{OUTPUT_QUALITY, ratio};
use crate::guardrail::{
    CheckContext, CheckDescriptor, CheckError, GuardrailCheck, GuardrailConfig, GuardrailPhase,
    GuardrailVerdict, Severity,
};
use serde_json::Value;
use std::collections::HashSet;

const SHORT_OUTPUT_CHARS: usize = 50;
const REPETITION_MIN_WORDS: usize = 10;
const DENSITY_MIN_CHARS: usize = 20;

/// Scores output on length, repetition, density and shouting.
///
/// A score below the threshold is a failing verdict rather than an error.
pub struct OutputQualityCheck {
    descriptor: CheckDescriptor,
    threshold: f64,
    min_length: usize,
}

impl OutputQualityCheck {
    /// Builds the check from configuration.
    #[must_use]
    pub fn new(config: &GuardrailConfig) -> Self {
        Self {
            descriptor: CheckDescriptor::new(
                OUTPUT_QUALITY,
                GuardrailPhase::Output,
                Severity::Medium,
            )
            .with_priority(20),
            threshold: config.threshold_for(OUTPUT_QUALITY, config.quality_threshold),
            min_length: config.min_output_length,
        }
    }

    /// Computes the score in `[0, 1]` and the issues that lowered it.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "each issue scales the score by a fixed penalty"
    )]
    pub fn score(&self, text: &str) -> (f64, Vec<&'static str>) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return (0.0, vec!["empty"]);
        }

        let length = trimmed.chars().count();
        let words: Vec<&str> = trimmed.split_whitespace().collect();
        let mut score = 1.0;
        let mut issues = Vec::new();

        if length < self.min_length {
            score *= 0.4;
            issues.push("too_short");
        }

        if words.len() > REPETITION_MIN_WORDS {
            let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
            if ratio(unique.len(), words.len()) < 0.5 {
                score *= 0.3;
                issues.push("repetitive");
            }
        }

        if length > DENSITY_MIN_CHARS {
            let alphanumeric = trimmed.chars().filter(|c| c.is_alphanumeric()).count();
            if ratio(alphanumeric, length) < 0.3 {
                score *= 0.2;
                issues.push("low_density");
            }
        }

        if length < SHORT_OUTPUT_CHARS {
            score *= 0.8;
        }

        let shouted = words
            .iter()
            .filter(|w| w.chars().any(char::is_alphabetic))
            .filter(|w| {
                w.chars().count() > 1
                    && w.chars()
                        .filter(|c| c.is_alphabetic())
                        .all(char::is_uppercase)
            })
            .count();
        if ratio(shouted, words.len()) > 0.3 {
            score *= 0.7;
            issues.push("shouting");
        }

        (score, issues)
    }
}

impl GuardrailCheck for OutputQualityCheck {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn evaluate(&self, text: &str, _context: &CheckContext) -> Result<GuardrailVerdict, CheckError> {
        let (score, issues) = self.score(text);
        let verdict = if score >= self.threshold {
            GuardrailVerdict::pass(OUTPUT_QUALITY, "Output meets quality standards")
        } else {
            GuardrailVerdict::fail(
                OUTPUT_QUALITY,
                self.descriptor.severity(),
                format!(
                    "Output quality score {score:.2} is below threshold {:.2}",
                    self.threshold
                ),
            )
        };
        let listed: Vec<Value> = issues.into_iter().map(Value::from).collect();
        Ok(verdict
            .with_score(score)
            .with_metadata("issues", listed))
    }
}
