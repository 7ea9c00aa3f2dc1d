//! Ports for the oracle, workers and checkpoint storage.

mod checkpoint;
mod oracle;
mod worker;

pub use checkpoint::{CheckpointError, CheckpointResult, CheckpointStore};
pub use oracle::{OracleError, OraclePrompt, PlanningOracle};
pub use worker::{Worker, WorkerAssignment, WorkerError, WorkerOutcome, WorkerReport};
