//! Shared world state for guardrail screening BDD scenarios.

use corridor::guardrail::{Enforcement, GuardrailManager, GuardrailVerdict};
use rstest::fixture;

/// Scenario world for guardrail screening behaviour tests.
pub struct ScreeningWorld {
    pub manager: Option<GuardrailManager>,
    pub enforcement: Enforcement,
    pub verdicts: Option<Vec<GuardrailVerdict>>,
}

impl Default for ScreeningWorld {
    fn default() -> Self {
        Self {
            manager: None,
            enforcement: Enforcement::Enforced,
            verdicts: None,
        }
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ScreeningWorld {
    ScreeningWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
