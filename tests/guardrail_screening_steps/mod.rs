//! Step definitions for guardrail screening scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
