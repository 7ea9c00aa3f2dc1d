//! Port for the language-model oracle that routes and plans.

use crate::workflow::domain::SessionId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Rendered prompt handed to the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OraclePrompt {
    session_id: SessionId,
    request: String,
    rendered: String,
}

impl OraclePrompt {
    /// Creates a prompt for `request` within a session.
    #[must_use]
    pub fn new(session_id: SessionId, request: impl Into<String>, rendered: String) -> Self {
        Self {
            session_id,
            request: request.into(),
            rendered,
        }
    }

    /// Session the prompt belongs to.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The user's request, unformatted.
    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Full prompt text including the worker catalog and history.
    #[must_use]
    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

/// Routing and planning oracle.
///
/// Replies are free text; the workflow extracts the JSON decision itself and
/// recovers when the text is unusable.
#[async_trait]
pub trait PlanningOracle: Send + Sync {
    /// Asks which node should handle a request that has no plan yet.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when the oracle cannot be reached.
    async fn propose_route(&self, prompt: &OraclePrompt) -> Result<String, OracleError>;

    /// Asks for an ordered task plan.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when the oracle cannot be reached.
    async fn propose_plan(&self, prompt: &OraclePrompt) -> Result<String, OracleError>;
}

/// Errors returned by oracle implementations.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// The oracle refused the call (rate limit, outage).
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// Transport or client failure.
    #[error("oracle backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl OracleError {
    /// Wraps a transport error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
