//! Then steps for guardrail screening BDD scenarios.

use super::world::ScreeningWorld;
use corridor::guardrail::{GuardrailVerdict, Severity};
use rstest_bdd_macros::then;

fn first_failure(world: &ScreeningWorld) -> Result<&GuardrailVerdict, eyre::Report> {
    world
        .verdicts
        .as_ref()
        .ok_or_else(|| eyre::eyre!("text was never screened"))?
        .iter()
        .find(|verdict| !verdict.passed())
        .ok_or_else(|| eyre::eyre!("expected a failing verdict"))
}

#[then(r#"screening fails on check "{check}" with severity "{severity}""#)]
fn fails_with_severity(
    world: &ScreeningWorld,
    check: String,
    severity: String,
) -> Result<(), eyre::Report> {
    let expected = Severity::try_from(severity.as_str())
        .map_err(|err| eyre::eyre!("invalid severity in scenario: {err}"))?;
    let failed = first_failure(world)?;
    eyre::ensure!(
        failed.check() == check,
        "expected check {check}, found {}",
        failed.check()
    );
    eyre::ensure!(
        failed.severity() == expected,
        "expected severity {expected}, found {}",
        failed.severity()
    );
    Ok(())
}

#[then(r#"the text is rejected by "{check}""#)]
fn fails_on_check(world: &ScreeningWorld, check: String) -> Result<(), eyre::Report> {
    let failed = first_failure(world)?;
    eyre::ensure!(
        failed.check() == check,
        "expected check {check}, found {}",
        failed.check()
    );
    Ok(())
}

#[then("every verdict passes")]
fn every_verdict_passes(world: &ScreeningWorld) -> Result<(), eyre::Report> {
    let verdicts = world
        .verdicts
        .as_ref()
        .ok_or_else(|| eyre::eyre!("text was never screened"))?;
    eyre::ensure!(!verdicts.is_empty(), "expected verdicts to be produced");
    if let Some(failed) = verdicts.iter().find(|verdict| !verdict.passed()) {
        return Err(eyre::eyre!(
            "check {} failed: {}",
            failed.check(),
            failed.reason()
        ));
    }
    Ok(())
}

#[then("no verdicts are produced")]
fn no_verdicts(world: &ScreeningWorld) -> Result<(), eyre::Report> {
    let verdicts = world
        .verdicts
        .as_ref()
        .ok_or_else(|| eyre::eyre!("text was never screened"))?;
    eyre::ensure!(verdicts.is_empty(), "expected no verdicts, found {verdicts:?}");
    Ok(())
}
