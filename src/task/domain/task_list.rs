//! Ordered plan of tasks for one request.

use super::{Task, TaskDomainError, TaskStatus};
use serde::{Deserialize, Serialize};

/// Ordered sequence of tasks plus the planner's reasoning.
///
/// The list shape is fixed at creation; only task statuses change. At most
/// one task is in progress at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    tasks: Vec<Task>,
    reasoning: String,
}

impl TaskList {
    /// Creates a task list in execution order.
    #[must_use]
    pub fn new(tasks: Vec<Task>, reasoning: impl Into<String>) -> Self {
        Self {
            tasks,
            reasoning: reasoning.into(),
        }
    }

    /// Returns the tasks in execution order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the reasoning behind the plan.
    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when the plan has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the task at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    /// Index of the first task that is pending or in progress.
    #[must_use]
    pub fn next_open(&self) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| !task.status().is_terminal())
    }

    /// Index of the in-progress task, if any.
    #[must_use]
    pub fn active(&self) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.status() == TaskStatus::InProgress)
    }

    /// Returns `true` when every task is completed or failed.
    #[must_use]
    pub fn all_settled(&self) -> bool {
        self.tasks.iter().all(|task| task.status().is_terminal())
    }

    /// Counts tasks with the given status.
    #[must_use]
    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.status() == status)
            .count()
    }

    /// Marks the task at `index` as in progress.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyActive`] when a different task
    /// is running, [`TaskDomainError::TaskIndexOutOfRange`] for a bad index,
    /// or [`TaskDomainError::InvalidStatusTransition`] when the task is not
    /// pending.
    pub fn start(&mut self, index: usize) -> Result<(), TaskDomainError> {
        let requested = self.task_at(index)?.id();
        if let Some(active) = self.active().and_then(|i| self.tasks.get(i))
            && active.id() != requested
        {
            return Err(TaskDomainError::TaskAlreadyActive {
                active: active.id(),
                requested,
            });
        }
        self.task_at_mut(index)?.start()
    }

    /// Records a result for the task at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] for a bad index or an illegal transition.
    pub fn complete(&mut self, index: usize, result: impl Into<String>) -> Result<(), TaskDomainError> {
        self.task_at_mut(index)?.complete(result)
    }

    /// Records a failure for the task at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] for a bad index or an illegal transition.
    pub fn fail(&mut self, index: usize, error: impl Into<String>) -> Result<(), TaskDomainError> {
        self.task_at_mut(index)?.fail(error)
    }

    /// Joins settled task outputs in plan order, one per line.
    ///
    /// Failed tasks contribute an `Error: ...` line. A single-task plan
    /// yields that task's text unchanged.
    #[must_use]
    pub fn assemble_result(&self) -> String {
        self.tasks
            .iter()
            .filter_map(Task::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn task_at(&self, index: usize) -> Result<&Task, TaskDomainError> {
        let len = self.tasks.len();
        self.tasks
            .get(index)
            .ok_or(TaskDomainError::TaskIndexOutOfRange { index, len })
    }

    fn task_at_mut(&mut self, index: usize) -> Result<&mut Task, TaskDomainError> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or(TaskDomainError::TaskIndexOutOfRange { index, len })
    }
}
