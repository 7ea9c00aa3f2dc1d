//! Checkpoint persistence port.

use crate::workflow::domain::{SessionId, WorkflowState};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for checkpoint operations.
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Keyed snapshot store for workflow state.
///
/// Saves are atomic per session key: a reader sees either the previous or
/// the new snapshot, never a mix.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Loads the latest snapshot for `session_id`.
    ///
    /// Returns `None` when the session has never been checkpointed.
    async fn load(&self, session_id: &SessionId) -> CheckpointResult<Option<WorkflowState>>;

    /// Replaces the snapshot for the state's session.
    async fn save(&self, state: &WorkflowState) -> CheckpointResult<()>;

    /// Flushes buffered writes before shutdown.
    async fn flush(&self) -> CheckpointResult<()> {
        Ok(())
    }
}

/// Errors returned by checkpoint stores.
#[derive(Debug, Clone, Error)]
pub enum CheckpointError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CheckpointError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
