//! Workflow services: registry, routing, planning and the run loop.

mod engine;
mod planner;
mod prompt;
mod registry;
mod session_gate;
mod supervisor;

pub use engine::{RunRequest, WorkflowEngine, WorkflowEngineError, WorkflowOutcome};
pub use planner::{PLANNER, Planner};
pub use prompt::PromptRenderer;
pub use registry::{
    RegisteredWorker, RegistryError, WorkerProfile, WorkerRegistry, WorkerRegistryBuilder,
};
pub use session_gate::{SessionGate, SessionPermit};
pub use supervisor::{RoutingDecision, RoutingError, SUPERVISOR, Supervisor};
