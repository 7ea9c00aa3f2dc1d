//! Domain model for planned work.
//!
//! A [`TaskList`] is the ordered plan for one request. Each [`Task`] names
//! the worker that owns it and moves through a strictly forward lifecycle.

mod error;
mod ids;
mod task;
mod task_list;
mod worker_name;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use task::{Task, TaskStatus};
pub use task_list::TaskList;
pub use worker_name::WorkerName;
