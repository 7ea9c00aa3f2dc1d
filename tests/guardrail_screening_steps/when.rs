//! When steps for guardrail screening BDD scenarios.

use super::world::{ScreeningWorld, run_async};
use corridor::guardrail::{CheckContext, GuardrailPhase};
use rstest_bdd_macros::when;

#[when(r#""{text}" is screened as {phase}"#)]
fn screen_text(world: &mut ScreeningWorld, text: String, phase: String) -> Result<(), eyre::Report> {
    let target = match phase.as_str() {
        "input" => GuardrailPhase::Input,
        "output" => GuardrailPhase::Output,
        other => return Err(eyre::eyre!("unknown phase '{other}' in scenario")),
    };
    let manager = world
        .manager
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing guardrail manager in scenario world"))?;
    let context = CheckContext::new().with_request(text.clone());
    let verdicts = run_async(manager.check(&text, target, &context, world.enforcement));
    world.verdicts = Some(verdicts);
    Ok(())
}
