//! Task and task-list model for orchestrated workflow runs.
//!
//! Tasks are created by the planner, mutated only by the workflow engine
//! immediately around a worker execution, and never removed. Status moves
//! `pending -> in_progress -> {completed | failed}` and never backwards, and
//! a [`domain::TaskList`] admits at most one in-progress task at a time.

pub mod domain;

#[cfg(test)]
mod tests;
