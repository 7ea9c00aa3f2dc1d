//! Guardrail configuration.

use super::domain::{GuardrailError, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-check overrides keyed by check name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckSettings {
    /// Turns the check on or off, overriding its default.
    pub enabled: Option<bool>,
    /// Severity stamped on failing verdicts.
    pub severity: Option<Severity>,
    /// Priority override; lower runs earlier.
    pub priority: Option<u16>,
    /// Check-specific threshold in `[0, 1]`.
    pub threshold: Option<f64>,
}

/// Guardrail pipeline configuration.
///
/// Built once at process start and passed to
/// [`GuardrailManager::from_config`](super::services::GuardrailManager::from_config).
///
/// # Examples
///
/// ```
/// use corridor::guardrail::GuardrailConfig;
///
/// let config = GuardrailConfig::default();
/// assert!(config.fail_fast);
/// assert_eq!(config.max_input_length, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardrailConfig {
    /// Master switch; when off every phase returns no verdicts.
    pub enabled: bool,
    /// Stop at the first failing verdict.
    pub fail_fast: bool,
    /// Evaluate checks concurrently in exhaustive mode.
    pub concurrent_exhaustive: bool,
    /// Emit a warning event for every failing verdict.
    pub log_violations: bool,
    /// Maximum request length in characters.
    pub max_input_length: usize,
    /// Maximum result length in characters.
    pub max_output_length: usize,
    /// Confidence at or above which a dangerous intent is blocked.
    pub intent_block_threshold: f64,
    /// Minimum acceptable output quality score.
    pub quality_threshold: f64,
    /// Output shorter than this is penalised.
    pub min_output_length: usize,
    /// Outputs with at most this many words skip the scope requirement.
    pub scope_min_words: usize,
    /// Keywords rejected by the content filter.
    pub blocked_keywords: Vec<String>,
    /// Extra secret-like patterns rejected in output.
    pub sensitive_patterns: Vec<String>,
    /// Per-check overrides.
    pub checks: BTreeMap<String, CheckSettings>,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fail_fast: true,
            concurrent_exhaustive: true,
            log_violations: true,
            max_input_length: 10_000,
            max_output_length: 5_000,
            intent_block_threshold: 0.8,
            quality_threshold: 0.5,
            min_output_length: 10,
            scope_min_words: 20,
            blocked_keywords: Vec::new(),
            sensitive_patterns: Vec::new(),
            checks: BTreeMap::new(),
        }
    }
}

impl GuardrailConfig {
    /// Creates a configuration that blocks earlier and checks scope.
    #[must_use]
    pub fn strict() -> Self {
        let mut checks = BTreeMap::new();
        checks.insert(
            "output_scope".to_owned(),
            CheckSettings {
                enabled: Some(true),
                ..CheckSettings::default()
            },
        );
        Self {
            intent_block_threshold: 0.6,
            quality_threshold: 0.6,
            max_input_length: 4_000,
            checks,
            ..Self::default()
        }
    }

    /// Creates a configuration that reports everything and blocks only
    /// near-certain danger.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            fail_fast: false,
            intent_block_threshold: 0.95,
            quality_threshold: 0.3,
            max_input_length: 50_000,
            max_output_length: 50_000,
            ..Self::default()
        }
    }

    /// Returns overrides for `check`, if configured.
    #[must_use]
    pub fn settings_for(&self, check: &str) -> Option<&CheckSettings> {
        self.checks.get(check)
    }

    /// Resolves the threshold for `check`, preferring a per-check override.
    #[must_use]
    pub fn threshold_for(&self, check: &str, fallback: f64) -> f64 {
        self.settings_for(check)
            .and_then(|settings| settings.threshold)
            .unwrap_or(fallback)
    }

    /// Rejects thresholds outside `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::InvalidThreshold`] naming the first
    /// offending setting.
    pub fn validate(&self) -> Result<(), GuardrailError> {
        let global = [
            ("intent_block_threshold", self.intent_block_threshold),
            ("quality_threshold", self.quality_threshold),
        ];
        let per_check = self.checks.iter().filter_map(|(name, settings)| {
            settings
                .threshold
                .map(|value| (name.as_str(), value))
        });
        for (name, value) in global.into_iter().chain(per_check) {
            if !(0.0..=1.0).contains(&value) {
                return Err(GuardrailError::InvalidThreshold {
                    name: name.to_owned(),
                    value,
                });
            }
        }
        Ok(())
    }
}
