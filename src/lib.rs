//! Corridor: guarded multi-worker request routing.
//!
//! A request passes through input guardrails, is routed by a supervisor to a
//! single worker or decomposed by a planner into an ordered task list, and
//! the assembled result passes through output guardrails before it is
//! returned.
//!
//! # Architecture
//!
//! Corridor follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for oracles, workers, checks and
//!   checkpoint storage
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task and task-list lifecycle
//! - [`intent`]: Rule-based intent classification
//! - [`guardrail`]: Input and output safety checks and their manager
//! - [`workflow`]: Supervisor, planner and the workflow engine
//! - [`config`]: YAML configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod guardrail;
pub mod intent;
pub mod task;
pub mod telemetry;
pub mod workflow;
