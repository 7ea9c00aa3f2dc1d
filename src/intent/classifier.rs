//! Compiled intent classifier.

use super::{
    IntentCategory, IntentClassification, IntentRuleError,
    rules::{INTENT_RULES, SAFE_CONTEXT_RULES, WRITE_VERBS},
};
use regex::Regex;

#[derive(Debug, Clone)]
struct CompiledRule {
    id: &'static str,
    category: IntentCategory,
    confidence: f64,
    regex: Regex,
}

#[derive(Debug, Clone)]
struct CompiledSafeContext {
    id: &'static str,
    from: IntentCategory,
    to: IntentCategory,
    confidence: f64,
    read_only: bool,
    regex: Regex,
}

/// Deterministic first-match classifier over the built-in rule table.
///
/// # Examples
///
/// ```
/// use corridor::intent::{IntentCategory, IntentClassifier};
///
/// let classifier = IntentClassifier::new().expect("built-in rules compile");
/// let intent = classifier.classify("Drop the entire database");
/// assert_eq!(intent.category(), IntentCategory::DestructiveAction);
/// ```
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<CompiledRule>,
    safe_contexts: Vec<CompiledSafeContext>,
    write_verbs: Regex,
}

impl IntentClassifier {
    /// Compiles the built-in rule table.
    ///
    /// # Errors
    ///
    /// Returns [`IntentRuleError`] when a rule pattern fails to compile.
    pub fn new() -> Result<Self, IntentRuleError> {
        let mut rules = INTENT_RULES
            .iter()
            .map(|spec| {
                Ok(CompiledRule {
                    id: spec.id,
                    category: spec.category,
                    confidence: spec.confidence,
                    regex: compile(spec.id, spec.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, IntentRuleError>>()?;
        // Stable: table order is kept within each group.
        rules.sort_by_key(|rule| !rule.category.is_dangerous());

        let safe_contexts = SAFE_CONTEXT_RULES
            .iter()
            .filter(|spec| spec.from.is_dangerous() && !spec.to.is_dangerous())
            .map(|spec| {
                Ok(CompiledSafeContext {
                    id: spec.id,
                    from: spec.from,
                    to: spec.to,
                    confidence: spec.confidence,
                    read_only: spec.read_only,
                    regex: compile(spec.id, spec.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, IntentRuleError>>()?;

        Ok(Self {
            rules,
            safe_contexts,
            write_verbs: compile("safe.write_verbs", WRITE_VERBS)?,
        })
    }

    /// Classifies `text`.
    ///
    /// The first matching rule wins. A dangerous match may be downgraded by
    /// a safe-context rule; no match yields [`IntentCategory::Other`] with
    /// zero confidence.
    #[must_use]
    pub fn classify(&self, text: &str) -> IntentClassification {
        let normalized = normalize(text);
        let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.regex.is_match(&normalized))
        else {
            return IntentClassification::unmatched();
        };

        let primary = IntentClassification::matched(rule.category, rule.confidence, rule.id);
        if !rule.category.is_dangerous() {
            return primary;
        }

        let writes = self.write_verbs.is_match(&normalized);
        match self.safe_contexts.iter().find(|safe| {
            safe.from == rule.category
                && !(safe.read_only && writes)
                && safe.regex.is_match(&normalized)
        }) {
            Some(safe) => primary.downgraded(safe.to, safe.confidence, safe.id),
            None => primary,
        }
    }

    /// Number of compiled primary rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

fn compile(rule_id: &str, pattern: &str) -> Result<Regex, IntentRuleError> {
    Regex::new(pattern).map_err(|source| IntentRuleError {
        rule_id: rule_id.to_owned(),
        source,
    })
}

/// Lowercases, straightens apostrophes and collapses whitespace.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('\u{2019}', "'")
}
