//! Pattern-based intent classification.
//!
//! The classifier maps free text to a coarse [`IntentCategory`] with a
//! confidence score. Guardrails use it to block dangerous requests and the
//! supervisor uses it as a routing fallback when the oracle misbehaves.
//!
//! Rules are compiled once by [`IntentClassifier::new`] and shared read-only
//! afterwards.

mod classifier;
mod domain;
mod rules;

pub use classifier::IntentClassifier;
pub(crate) use classifier::normalize;
pub use domain::{IntentCategory, IntentClassification, IntentRuleError, ParseIntentError};

#[cfg(test)]
mod tests;
