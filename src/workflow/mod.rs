//! Hub-and-spoke workflow orchestration.
//!
//! A run validates the request, then loops through the [`services::Supervisor`]:
//! each iteration either asks the planner for a task list, dispatches the
//! next open task to its worker, or ends the run. The result is validated
//! again before it is returned. State is checkpointed per session after
//! every step so a later request can see the conversation history.
//!
//! Oracle replies are untrusted text. Unusable replies fall back to intent
//! classification, and a named worker that is not registered ends the run
//! without executing anything.

pub mod adapters;
mod config;
pub mod domain;
pub mod ports;
pub mod services;

pub use config::{SessionPolicy, WorkflowConfig};
pub use services::{RunRequest, WorkflowEngine, WorkflowEngineError, WorkflowOutcome};

#[cfg(test)]
mod tests;
