//! Denylist of high-risk phrase templates.

use super::{SYSTEM_PROTECTION, patterns::PatternSet};
use crate::guardrail::{
    CheckContext, CheckDescriptor, CheckError, GuardrailCheck, GuardrailError, GuardrailPhase,
    GuardrailVerdict, Severity,
};

const DANGER_TEMPLATES: [(&str, &str); 13] = [
    (
        "delete source files",
        r"\b(delete|remove|rm)\b.*\bsrc/\S*\.(py|rs|go|js|ts)\b",
    ),
    ("edit main module", r"\b(modify|edit|change)\b.*\bmain\.(py|rs)\b"),
    (
        "overwrite agent code",
        r"\b(overwrite|replace)\b.*\bagents?\b.*\.(py|rs)\b",
    ),
    (
        "delete configuration",
        r"\b(delete|remove)\b.*\bconfig\S*\.(ya?ml|toml|json)\b",
    ),
    (
        "change system settings",
        r"\b(modify|change)\b.*\b(system|global|security) settings\b",
    ),
    ("drop all data", r"\b(drop|delete)\b.*\ball\b.*\bdata\b"),
    (
        "drop entire database",
        r"\bdrop\b.*\b(entire|whole|every)\b.*\b(databases?|schemas?)\b",
    ),
    ("truncate all tables", r"\btruncate\b.*\ball\b.*\btables\b"),
    (
        "wipe entire database",
        r"\b(wipe|erase)\b.*\bentire\b.*\bdatabase\b",
    ),
    ("kill all processes", r"\bkill\b.*\ball\b.*\bprocess(es)?\b"),
    (
        "shut down entire system",
        r"\bshut ?down\b.*\bentire\b.*\bsystem\b",
    ),
    ("disable all agents", r"\b(disable|stop)\b.*\ball\b.*\bagents\b"),
    (
        "override agent behaviour",
        r"\b(override|change)\b.*\bagents?\b.*\bbehaviou?r\b",
    ),
];

/// Fails on any danger template, regardless of classified intent.
pub struct SystemProtectionCheck {
    descriptor: CheckDescriptor,
    patterns: PatternSet,
}

impl SystemProtectionCheck {
    /// Compiles the fixed denylist.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::InvalidPattern`] if a template fails to
    /// compile.
    pub fn new() -> Result<Self, GuardrailError> {
        Ok(Self {
            descriptor: CheckDescriptor::new(
                SYSTEM_PROTECTION,
                GuardrailPhase::Input,
                Severity::Critical,
            )
            .with_priority(20),
            patterns: PatternSet::compile(SYSTEM_PROTECTION, DANGER_TEMPLATES)?,
        })
    }
}

impl GuardrailCheck for SystemProtectionCheck {
    fn descriptor(&self) -> &CheckDescriptor {
        &self.descriptor
    }

    fn evaluate(&self, text: &str, _context: &CheckContext) -> Result<GuardrailVerdict, CheckError> {
        Ok(match self.patterns.first_match(text) {
            Some(label) => GuardrailVerdict::fail(
                SYSTEM_PROTECTION,
                self.descriptor.severity(),
                format!("System protection violation: {label}"),
            )
            .with_metadata("pattern", label),
            None => GuardrailVerdict::pass(SYSTEM_PROTECTION, "No protected resources targeted"),
        })
    }
}
