//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating tasks and task lists.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested status change is not permitted by the lifecycle.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Status before the attempted transition.
        from: TaskStatus,
        /// Requested target status.
        to: TaskStatus,
    },

    /// Another task in the list is already running.
    #[error("task {active} is already in progress, cannot start {requested}")]
    TaskAlreadyActive {
        /// Task currently holding the in-progress slot.
        active: TaskId,
        /// Task that was asked to start.
        requested: TaskId,
    },

    /// The task index does not exist in the list.
    #[error("task index {index} is out of range for a list of {len} tasks")]
    TaskIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of tasks in the list.
        len: usize,
    },

    /// The worker name is empty after trimming.
    #[error("worker name must not be empty")]
    EmptyWorkerName,

    /// The worker name contains characters outside `[a-z0-9_]`.
    #[error("invalid worker name '{0}', expected [a-z0-9_]")]
    InvalidWorkerName(String),

    /// The worker name exceeds the maximum length.
    #[error("worker name '{0}' exceeds 100 characters")]
    WorkerNameTooLong(String),
}

/// Error returned while parsing task statuses from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
