//! In-memory checkpoint store for tests and single-process deployments.

use crate::workflow::{
    domain::{SessionId, WorkflowState},
    ports::{CheckpointError, CheckpointResult, CheckpointStore},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory checkpoint store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    snapshots: Arc<RwLock<HashMap<SessionId, WorkflowState>>>,
}

impl InMemoryCheckpointStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError`] when the lock is poisoned.
    pub fn session_count(&self) -> CheckpointResult<usize> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|err| CheckpointError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(snapshots.len())
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, session_id: &SessionId) -> CheckpointResult<Option<WorkflowState>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|err| CheckpointError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(snapshots.get(session_id).cloned())
    }

    async fn save(&self, state: &WorkflowState) -> CheckpointResult<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|err| CheckpointError::persistence(std::io::Error::other(err.to_string())))?;
        snapshots.insert(state.session_id().clone(), state.clone());
        Ok(())
    }
}
