//! `PostgreSQL` adapter for workflow checkpoints.

mod models;
mod schema;
mod store;

pub use store::{CheckpointPgPool, PostgresCheckpointStore};
