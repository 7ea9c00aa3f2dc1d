//! Guardrail orchestration services.

mod manager;

pub use manager::GuardrailManager;
