//! Given steps for guardrail screening BDD scenarios.

use std::sync::Arc;

use super::world::ScreeningWorld;
use corridor::guardrail::{Enforcement, GuardrailConfig, GuardrailManager};
use corridor::intent::IntentClassifier;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("the default guardrail pipeline")]
fn default_pipeline(world: &mut ScreeningWorld) -> Result<(), eyre::Report> {
    let classifier = Arc::new(IntentClassifier::new().wrap_err("build intent classifier")?);
    let manager = GuardrailManager::from_config(&GuardrailConfig::default(), classifier)
        .wrap_err("build guardrail manager")?;
    world.manager = Some(manager);
    Ok(())
}

#[given("the caller bypasses guardrails")]
fn caller_bypasses(world: &mut ScreeningWorld) {
    world.enforcement = Enforcement::Bypassed;
}
