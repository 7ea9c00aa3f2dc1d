//! Workflow engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a second run for a busy session does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPolicy {
    /// Wait for the running request to finish.
    #[default]
    Queue,
    /// Fail immediately with a busy error.
    Reject,
}

/// Limits and defaults applied to every run.
///
/// # Examples
///
/// ```
/// use corridor::workflow::WorkflowConfig;
/// use std::time::Duration;
///
/// let config = WorkflowConfig::default();
/// assert_eq!(config.max_iterations, 50);
/// assert_eq!(config.worker_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Supervisor iterations allowed per run.
    pub max_iterations: u32,
    /// Planner replies that may fail to parse before the run gives up.
    pub max_planner_attempts: u32,
    /// Deadline for a single worker execution.
    #[serde(with = "humantime_serde")]
    pub worker_timeout: Duration,
    /// Worker receiving conversational and very short requests when the
    /// routing reply is unusable.
    pub general_worker: String,
    /// Concurrency policy per session.
    pub session_policy: SessionPolicy,
    /// Earlier exchanges included in prompts and assignments.
    pub history_window: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            max_planner_attempts: 3,
            worker_timeout: Duration::from_secs(30),
            general_worker: "general_qa".to_owned(),
            session_policy: SessionPolicy::Queue,
            history_window: 3,
        }
    }
}
