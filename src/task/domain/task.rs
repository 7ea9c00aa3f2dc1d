//! Task entity and its status lifecycle.

use super::{ParseTaskStatusError, TaskDomainError, TaskId, WorkerName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Planned but not yet dispatched.
    Pending,
    /// Dispatched to its worker.
    InProgress,
    /// Worker returned a result.
    Completed,
    /// Worker raised, reported an error, or timed out.
    Failed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` when `target` is a legal next status.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::InProgress) | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }

    /// Returns `true` for statuses that admit no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Short marker used when rendering a plan for the oracle.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Pending => "[ ]",
            Self::InProgress => "[~]",
            Self::Completed => "[x]",
            Self::Failed => "[!]",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// One unit of delegated work with a single assigned worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    worker: WorkerName,
    description: String,
    status: TaskStatus,
    result: Option<String>,
    error: Option<String>,
}

impl Task {
    /// Creates a pending task assigned to `worker`.
    #[must_use]
    pub fn new(worker: WorkerName, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            worker,
            description: description.into(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the assigned worker.
    #[must_use]
    pub const fn worker(&self) -> &WorkerName {
        &self.worker
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the worker result, if completed.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Returns the error text, if failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Marks the task as dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] unless the task is
    /// pending.
    pub fn start(&mut self) -> Result<(), TaskDomainError> {
        self.transition_to(TaskStatus::InProgress)
    }

    /// Records a successful result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] unless the task is
    /// in progress.
    pub fn complete(&mut self, result: impl Into<String>) -> Result<(), TaskDomainError> {
        self.transition_to(TaskStatus::Completed)?;
        self.result = Some(result.into());
        Ok(())
    }

    /// Records a failure.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] unless the task is
    /// in progress.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TaskDomainError> {
        self.transition_to(TaskStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    /// Returns this task's contribution to the assembled final result.
    ///
    /// Unsettled tasks contribute nothing.
    #[must_use]
    pub fn summary_line(&self) -> Option<String> {
        match self.status {
            TaskStatus::Completed => Some(self.result.clone().unwrap_or_default()),
            TaskStatus::Failed => Some(format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("unknown error")
            )),
            TaskStatus::Pending | TaskStatus::InProgress => None,
        }
    }

    fn transition_to(&mut self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}
