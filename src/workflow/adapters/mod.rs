//! Checkpoint store adapters.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCheckpointStore;
pub use postgres::{CheckpointPgPool, PostgresCheckpointStore};
