//! Port for the specialised workers that execute tasks.

use crate::task::domain::{TaskId, WorkerName};
use crate::workflow::domain::{ConversationEntry, SessionId, TokenUsage};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Task handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerAssignment {
    session_id: SessionId,
    task_id: TaskId,
    worker: WorkerName,
    description: String,
    request: String,
    history: Vec<ConversationEntry>,
}

impl WorkerAssignment {
    /// Creates an assignment for one task.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        task_id: TaskId,
        worker: WorkerName,
        description: impl Into<String>,
        request: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            task_id,
            worker,
            description: description.into(),
            request: request.into(),
            history: Vec::new(),
        }
    }

    /// Attaches recent conversation history.
    #[must_use]
    pub fn with_history(mut self, history: Vec<ConversationEntry>) -> Self {
        self.history = history;
        self
    }

    /// Session key.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Task being executed.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Worker the task was assigned to.
    #[must_use]
    pub const fn worker(&self) -> &WorkerName {
        &self.worker
    }

    /// What the worker should do.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The user's original request.
    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Recent exchanges, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ConversationEntry] {
        &self.history
    }
}

/// How a task ended from the worker's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The worker produced a result.
    Completed(String),
    /// The worker reported an error.
    Failed(String),
}

/// Result of one worker execution plus the usage it incurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    outcome: WorkerOutcome,
    tool_calls: Vec<String>,
    tokens: TokenUsage,
}

impl WorkerReport {
    /// Report for a successful execution.
    #[must_use]
    pub fn completed(result: impl Into<String>) -> Self {
        Self::with_outcome(WorkerOutcome::Completed(result.into()))
    }

    /// Report for an execution that ended in an error.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self::with_outcome(WorkerOutcome::Failed(error.into()))
    }

    const fn with_outcome(outcome: WorkerOutcome) -> Self {
        Self {
            outcome,
            tool_calls: Vec::new(),
            tokens: TokenUsage::new(0, 0),
        }
    }

    /// Records one tool invocation by name.
    #[must_use]
    pub fn with_tool_call(mut self, tool: impl Into<String>) -> Self {
        self.tool_calls.push(tool.into());
        self
    }

    /// Records token usage.
    #[must_use]
    pub const fn with_tokens(mut self, tokens: TokenUsage) -> Self {
        self.tokens = tokens;
        self
    }

    /// Task outcome.
    #[must_use]
    pub const fn outcome(&self) -> &WorkerOutcome {
        &self.outcome
    }

    /// Tools invoked, one entry per call.
    #[must_use]
    pub fn tool_calls(&self) -> &[String] {
        &self.tool_calls
    }

    /// Token usage.
    #[must_use]
    pub const fn tokens(&self) -> TokenUsage {
        self.tokens
    }
}

/// A specialised executor registered under a [`WorkerName`].
#[async_trait]
pub trait Worker: Send + Sync {
    /// Executes one task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError`] when the worker raises; the task is then
    /// marked failed with the error text.
    async fn execute(&self, assignment: &WorkerAssignment) -> Result<WorkerReport, WorkerError>;
}

/// Errors raised by worker implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkerError {
    /// The worker could not complete the task.
    #[error("{0}")]
    Execution(String),

    /// Transport or tool failure.
    #[error("{0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkerError {
    /// Wraps a transport or tool error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
