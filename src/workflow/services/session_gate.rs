//! Serialises runs that share a session key.

use crate::workflow::{SessionPolicy, domain::SessionId, services::WorkflowEngineError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Proof that the holder is the only run for its session.
///
/// Dropping the permit admits the next waiting run.
#[derive(Debug)]
pub struct SessionPermit {
    _guard: OwnedMutexGuard<()>,
}

/// Per-session mutual exclusion with a queue or reject policy.
///
/// Locks are held weakly so idle sessions do not accumulate.
#[derive(Debug, Default)]
pub struct SessionGate {
    policy: SessionPolicy,
    locks: Mutex<HashMap<SessionId, Weak<AsyncMutex<()>>>>,
}

impl SessionGate {
    /// Creates a gate with the given policy.
    #[must_use]
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Waits for, or under the reject policy demands, exclusive access.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowEngineError::SessionBusy`] under the reject policy
    /// when another run holds the session.
    pub async fn acquire(&self, session_id: &SessionId) -> Result<SessionPermit, WorkflowEngineError> {
        let lock = self.lock_for(session_id);
        let guard = match self.policy {
            SessionPolicy::Queue => lock.lock_owned().await,
            SessionPolicy::Reject => lock
                .try_lock_owned()
                .map_err(|_| WorkflowEngineError::SessionBusy(session_id.clone()))?,
        };
        Ok(SessionPermit { _guard: guard })
    }

    fn lock_for(&self, session_id: &SessionId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, weak| weak.strong_count() > 0);
        if let Some(existing) = locks.get(session_id).and_then(Weak::upgrade) {
            return existing;
        }
        let created = Arc::new(AsyncMutex::new(()));
        locks.insert(session_id.clone(), Arc::downgrade(&created));
        created
    }
}
