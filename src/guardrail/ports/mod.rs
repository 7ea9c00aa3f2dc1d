//! Port contracts for guardrail checks.

mod check;

pub use check::{CheckContext, GuardrailCheck};
