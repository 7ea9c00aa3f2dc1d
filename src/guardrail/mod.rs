//! Guardrail validation pipeline.
//!
//! Independent checks run over request text (input phase) and final results
//! (output phase), each producing a [`GuardrailVerdict`]. The
//! [`GuardrailManager`] combines them under fail-fast or exhaustive policy:
//!
//! - Domain types in [`domain`]
//! - The check capability in [`ports`]
//! - Built-in checks in [`checks`]
//! - Orchestration in [`services`]

pub mod checks;
mod config;
pub mod domain;
pub mod ports;
pub mod services;

pub use config::{CheckSettings, GuardrailConfig};
pub use domain::{
    CheckDescriptor, CheckError, Enforcement, GuardrailError, GuardrailPhase, GuardrailVerdict,
    ParseSeverityError, Severity,
};
pub use ports::{CheckContext, GuardrailCheck};
pub use services::GuardrailManager;

#[cfg(test)]
mod tests;
