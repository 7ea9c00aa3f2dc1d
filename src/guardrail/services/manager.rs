//! Ordered evaluation of the configured checks for a phase.

use crate::guardrail::{
    CheckContext, CheckSettings, Enforcement, GuardrailCheck, GuardrailConfig, GuardrailError,
    GuardrailPhase, GuardrailVerdict, Severity, checks::builtin_checks,
};
use crate::intent::IntentClassifier;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

struct RegisteredCheck {
    check: Arc<dyn GuardrailCheck>,
    enabled: bool,
    priority: u16,
    severity_override: Option<Severity>,
    order: usize,
}

impl RegisteredCheck {
    fn name(&self) -> &str {
        self.check.descriptor().name()
    }

    fn sort_key(&self) -> (u16, bool, usize) {
        (
            self.priority,
            !self.check.descriptor().is_intelligent(),
            self.order,
        )
    }
}

/// Runs the active checks of a phase under fail-fast or exhaustive policy.
///
/// Checks are ordered by priority, then context-aware checks before pattern
/// checks, then registration order. The manager never propagates a check's
/// internal error: it becomes a critical failing verdict naming the check.
pub struct GuardrailManager {
    checks: Vec<RegisteredCheck>,
    enabled: bool,
    fail_fast: bool,
    concurrent_exhaustive: bool,
    log_violations: bool,
}

impl GuardrailManager {
    /// Creates a manager with no checks registered.
    #[must_use]
    pub const fn empty(config: &GuardrailConfig) -> Self {
        Self {
            checks: Vec::new(),
            enabled: config.enabled,
            fail_fast: config.fail_fast,
            concurrent_exhaustive: config.concurrent_exhaustive,
            log_violations: config.log_violations,
        }
    }

    /// Creates a manager with every built-in check registered.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError`] when a threshold is out of range, a
    /// configured pattern fails to compile, or a per-check entry names no
    /// built-in check.
    pub fn from_config(
        config: &GuardrailConfig,
        classifier: Arc<IntentClassifier>,
    ) -> Result<Self, GuardrailError> {
        config.validate()?;
        let mut manager = Self::empty(config);
        for check in builtin_checks(config, &classifier)? {
            let settings = config.settings_for(check.descriptor().name()).cloned();
            manager.register(check, settings.as_ref())?;
        }
        if let Some(unknown) = config
            .checks
            .keys()
            .find(|name| !manager.checks.iter().any(|r| r.name() == name.as_str()))
        {
            return Err(GuardrailError::UnknownCheck(unknown.clone()));
        }
        Ok(manager)
    }

    /// Registers an additional check after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::DuplicateCheck`] when the name is taken.
    pub fn register(
        &mut self,
        check: Arc<dyn GuardrailCheck>,
        settings: Option<&CheckSettings>,
    ) -> Result<(), GuardrailError> {
        let descriptor = check.descriptor();
        if self.checks.iter().any(|r| r.name() == descriptor.name()) {
            return Err(GuardrailError::DuplicateCheck(descriptor.name().to_owned()));
        }
        let registered = RegisteredCheck {
            enabled: settings
                .and_then(|s| s.enabled)
                .unwrap_or(descriptor.enabled_by_default()),
            priority: settings
                .and_then(|s| s.priority)
                .unwrap_or(descriptor.priority()),
            severity_override: settings.and_then(|s| s.severity),
            order: self.checks.len(),
            check,
        };
        self.checks.push(registered);
        Ok(())
    }

    /// Builder form of [`Self::register`] without overrides.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::DuplicateCheck`] when the name is taken.
    pub fn with_check(mut self, check: Arc<dyn GuardrailCheck>) -> Result<Self, GuardrailError> {
        self.register(check, None)?;
        Ok(self)
    }

    /// Overrides the evaluation policy.
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Enables or disables a registered check.
    ///
    /// # Errors
    ///
    /// Returns [`GuardrailError::UnknownCheck`] when no check has `name`.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), GuardrailError> {
        let registered = self
            .checks
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| GuardrailError::UnknownCheck(name.to_owned()))?;
        registered.enabled = enabled;
        Ok(())
    }

    /// Returns `true` in fail-fast mode.
    #[must_use]
    pub const fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Names of the checks that would run for `phase`, in evaluation order.
    #[must_use]
    pub fn active_checks(&self, phase: GuardrailPhase) -> Vec<&str> {
        self.active(phase)
            .into_iter()
            .map(RegisteredCheck::name)
            .collect()
    }

    /// Evaluates `text` against the active checks of `phase`.
    ///
    /// Returns no verdicts when enforcement is bypassed or the pipeline is
    /// disabled. In fail-fast mode the result is the single first failing
    /// verdict, or every passing verdict when nothing fails. In exhaustive
    /// mode there is exactly one verdict per active check, in order.
    pub async fn check(
        &self,
        text: &str,
        phase: GuardrailPhase,
        context: &CheckContext,
        enforcement: Enforcement,
    ) -> Vec<GuardrailVerdict> {
        if enforcement.is_bypassed() {
            debug!(phase = %phase, "guardrails bypassed by caller");
            return Vec::new();
        }
        if !self.enabled {
            return Vec::new();
        }

        let active = self.active(phase);
        let verdicts = if self.fail_fast {
            run_fail_fast(&active, text, context)
        } else if self.concurrent_exhaustive {
            run_concurrently(&active, text, context).await
        } else {
            active
                .iter()
                .map(|registered| evaluate_guarded(registered, text, context))
                .collect()
        };

        if self.log_violations {
            for verdict in verdicts.iter().filter(|v| !v.passed()) {
                warn!(
                    phase = %phase,
                    check = verdict.check(),
                    severity = %verdict.severity(),
                    reason = verdict.reason(),
                    "guardrail violation"
                );
            }
        }
        verdicts
    }

    fn active(&self, phase: GuardrailPhase) -> Vec<&RegisteredCheck> {
        let mut active: Vec<&RegisteredCheck> = self
            .checks
            .iter()
            .filter(|r| r.enabled && r.check.descriptor().phase() == phase)
            .collect();
        active.sort_by_key(|r| r.sort_key());
        active
    }
}

fn run_fail_fast(
    active: &[&RegisteredCheck],
    text: &str,
    context: &CheckContext,
) -> Vec<GuardrailVerdict> {
    let mut passed = Vec::with_capacity(active.len());
    for registered in active {
        let verdict = evaluate_guarded(registered, text, context);
        if !verdict.passed() {
            return vec![verdict];
        }
        passed.push(verdict);
    }
    passed
}

async fn run_concurrently(
    active: &[&RegisteredCheck],
    text: &str,
    context: &CheckContext,
) -> Vec<GuardrailVerdict> {
    let mut tasks = JoinSet::new();
    for (slot, registered) in active.iter().enumerate() {
        let check = Arc::clone(&registered.check);
        let severity_override = registered.severity_override;
        let owned_text = text.to_owned();
        let owned_context = context.clone();
        tasks.spawn_blocking(move || {
            let verdict =
                evaluate_check(check.as_ref(), severity_override, &owned_text, &owned_context);
            (slot, verdict)
        });
    }

    let mut slots: Vec<Option<GuardrailVerdict>> = vec![None; active.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((slot, verdict)) => {
                if let Some(entry) = slots.get_mut(slot) {
                    *entry = Some(verdict);
                }
            }
            Err(err) => warn!(error = %err, "guardrail evaluation task did not complete"),
        }
    }

    slots
        .into_iter()
        .zip(active)
        .map(|(verdict, registered)| {
            verdict.unwrap_or_else(|| malfunction(registered.name(), "evaluation was cancelled"))
        })
        .collect()
}

fn evaluate_guarded(
    registered: &RegisteredCheck,
    text: &str,
    context: &CheckContext,
) -> GuardrailVerdict {
    evaluate_check(
        registered.check.as_ref(),
        registered.severity_override,
        text,
        context,
    )
}

fn evaluate_check(
    check: &dyn GuardrailCheck,
    severity_override: Option<Severity>,
    text: &str,
    context: &CheckContext,
) -> GuardrailVerdict {
    let name = check.descriptor().name();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.evaluate(text, context)));
    let verdict = match outcome {
        Ok(Ok(verdict)) => match severity_override {
            Some(severity) => verdict.with_failure_severity(severity),
            None => verdict,
        },
        Ok(Err(err)) => malfunction(name, &err.to_string()),
        Err(_) => malfunction(name, "check panicked"),
    };
    debug!(
        check = name,
        passed = verdict.passed(),
        reason = verdict.reason(),
        "guardrail evaluated"
    );
    verdict
}

fn malfunction(check: &str, detail: &str) -> GuardrailVerdict {
    GuardrailVerdict::fail(
        check,
        Severity::Critical,
        format!("Guardrail '{check}' malfunctioned: {detail}"),
    )
    .with_metadata("malfunction", true)
}
