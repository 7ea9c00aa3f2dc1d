//! Case-insensitive labelled pattern sets shared by the denylist checks.

use crate::guardrail::GuardrailError;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone)]
pub(super) struct PatternSet {
    entries: Vec<(String, Regex)>,
}

impl PatternSet {
    /// Compiles `(label, pattern)` pairs.
    pub(super) fn compile<'a>(
        check: &str,
        patterns: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, GuardrailError> {
        let entries = patterns
            .into_iter()
            .map(|(label, pattern)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (label.to_owned(), regex))
                    .map_err(|source| GuardrailError::InvalidPattern {
                        check: check.to_owned(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Compiles literal phrases as whole-word matches.
    pub(super) fn phrases<'a>(
        check: &str,
        phrases: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, GuardrailError> {
        let escaped: Vec<(String, String)> = phrases
            .into_iter()
            .map(str::trim)
            .filter(|phrase| !phrase.is_empty())
            .map(|phrase| {
                (
                    phrase.to_lowercase(),
                    format!(r"\b{}\b", regex::escape(phrase)),
                )
            })
            .collect();
        Self::compile(
            check,
            escaped
                .iter()
                .map(|(label, pattern)| (label.as_str(), pattern.as_str())),
        )
    }

    /// Label of the first pattern matching `text`.
    pub(super) fn first_match(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(label, _)| label.as_str())
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
