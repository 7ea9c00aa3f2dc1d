//! Startup-time registry of workers and their catalog entries.

use crate::task::domain::{TaskDomainError, WorkerName};
use crate::workflow::ports::Worker;
use std::sync::Arc;
use thiserror::Error;

/// Catalog entry describing a worker to the oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerProfile {
    description: String,
    capabilities: Vec<String>,
    use_cases: Vec<String>,
}

impl WorkerProfile {
    /// Creates a profile with a one-line description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            capabilities: Vec::new(),
            use_cases: Vec::new(),
        }
    }

    /// Sets the capability list.
    #[must_use]
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Sets example use cases.
    #[must_use]
    pub fn with_use_cases<I, S>(mut self, use_cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.use_cases = use_cases.into_iter().map(Into::into).collect();
        self
    }

    /// One-line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// What the worker can do.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Example requests the worker handles.
    #[must_use]
    pub fn use_cases(&self) -> &[String] {
        &self.use_cases
    }
}

/// Errors raised while building a registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is used for routing targets.
    #[error("worker name '{0}' is reserved")]
    ReservedName(WorkerName),

    /// The name is already registered.
    #[error("worker '{0}' is already registered")]
    DuplicateWorker(WorkerName),

    /// The name failed validation.
    #[error(transparent)]
    InvalidName(#[from] TaskDomainError),
}

/// A registered worker.
#[derive(Clone)]
pub struct RegisteredWorker {
    name: WorkerName,
    profile: WorkerProfile,
    worker: Arc<dyn Worker>,
}

impl RegisteredWorker {
    /// Registry key.
    #[must_use]
    pub const fn name(&self) -> &WorkerName {
        &self.name
    }

    /// Catalog entry.
    #[must_use]
    pub const fn profile(&self) -> &WorkerProfile {
        &self.profile
    }

    /// Executor.
    #[must_use]
    pub fn worker(&self) -> Arc<dyn Worker> {
        Arc::clone(&self.worker)
    }
}

/// Read-only mapping from worker names to executors, in registration order.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    entries: Vec<RegisteredWorker>,
}

impl WorkerRegistry {
    /// Starts an empty registry builder.
    #[must_use]
    pub fn builder() -> WorkerRegistryBuilder {
        WorkerRegistryBuilder::default()
    }

    /// Looks up a worker by name.
    #[must_use]
    pub fn get(&self, name: &WorkerName) -> Option<&RegisteredWorker> {
        self.entries.iter().find(|entry| &entry.name == name)
    }

    /// Returns `true` when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &WorkerName) -> bool {
        self.get(name).is_some()
    }

    /// Resolves a raw name from an oracle reply to a registered worker.
    ///
    /// The reply is normalised with [`WorkerName::from_reply`] first.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<WorkerName> {
        WorkerName::from_reply(raw)
            .ok()
            .filter(|name| self.contains(name))
    }

    /// Registered workers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredWorker> {
        self.entries.iter()
    }

    /// Number of registered workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no worker is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the single registered worker named in free text.
    ///
    /// Names must appear as whole words. Returns `None` when no name or
    /// more than one distinct name appears.
    #[must_use]
    pub fn mentioned_in(&self, text: &str) -> Option<WorkerName> {
        let lowered = text.to_lowercase();
        let mut found = self
            .entries
            .iter()
            .filter(|entry| contains_word(&lowered, entry.name.as_str()));
        let first = found.next()?;
        if found.next().is_some() {
            return None;
        }
        Some(first.name.clone())
    }
}

/// Builder collecting workers before the registry is frozen.
#[derive(Default)]
pub struct WorkerRegistryBuilder {
    entries: Vec<RegisteredWorker>,
}

impl WorkerRegistryBuilder {
    /// Adds a worker.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the name is invalid, reserved, or
    /// already taken.
    pub fn register(
        mut self,
        name: impl Into<String>,
        profile: WorkerProfile,
        worker: Arc<dyn Worker>,
    ) -> Result<Self, RegistryError> {
        let worker_name = WorkerName::new(name)?;
        if worker_name.is_routing_keyword() {
            return Err(RegistryError::ReservedName(worker_name));
        }
        if self.entries.iter().any(|entry| entry.name == worker_name) {
            return Err(RegistryError::DuplicateWorker(worker_name));
        }
        self.entries.push(RegisteredWorker {
            name: worker_name,
            profile,
            worker,
        });
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> WorkerRegistry {
        WorkerRegistry {
            entries: self.entries,
        }
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    haystack.match_indices(word).any(|(start, matched)| {
        let before = haystack.get(..start).and_then(|s| s.chars().next_back());
        let after = haystack
            .get(start.saturating_add(matched.len())..)
            .and_then(|s| s.chars().next());
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}
