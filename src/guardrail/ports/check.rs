//! The check capability and the context passed to it.

use crate::guardrail::domain::{CheckDescriptor, CheckError, GuardrailVerdict};

/// Optional context supplied alongside the text being checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckContext {
    request: Option<String>,
    session_id: Option<String>,
    worker: Option<String>,
}

impl CheckContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the original request text.
    #[must_use]
    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = Some(request.into());
        self
    }

    /// Sets the session the text belongs to.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Sets the worker that produced the text.
    #[must_use]
    pub fn with_worker(mut self, worker: impl Into<String>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Original request text, if known.
    #[must_use]
    pub fn request(&self) -> Option<&str> {
        self.request.as_deref()
    }

    /// Session identifier, if known.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Producing worker, if known.
    #[must_use]
    pub fn worker(&self) -> Option<&str> {
        self.worker.as_deref()
    }
}

/// A side-effect-free validator over input or output text.
///
/// Implementations must be safe to evaluate concurrently; the manager may
/// run them on the blocking pool in exhaustive mode.
pub trait GuardrailCheck: Send + Sync {
    /// Static registration metadata.
    fn descriptor(&self) -> &CheckDescriptor;

    /// Evaluates `text`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] when the check cannot reach a verdict.
    fn evaluate(&self, text: &str, context: &CheckContext) -> Result<GuardrailVerdict, CheckError>;
}
