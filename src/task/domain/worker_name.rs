//! Worker identifiers shared by the registry, routing and task plans.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_LEN: usize = 100;

/// Route targets owned by the workflow itself rather than by a worker.
const ROUTING_KEYWORDS: [&str; 4] = ["planner", "supervisor", "end", "__end__"];

/// Key under which a worker is registered and assigned tasks.
///
/// The same value appears in three places: the registry catalog shown to
/// the oracle, the oracle's routing and planning replies, and persisted
/// task lists. Oracle replies are matched through
/// [`WorkerRegistry::resolve`](crate::workflow::services::WorkerRegistry::resolve),
/// which reads them with [`WorkerName::from_reply`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkerName(String);

impl WorkerName {
    /// Validates a name given at registration or read from a stored plan.
    ///
    /// Surrounding whitespace is dropped and ASCII letters are lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyWorkerName`] for a blank value,
    /// [`TaskDomainError::WorkerNameTooLong`] past 100 bytes, and
    /// [`TaskDomainError::InvalidWorkerName`] for anything outside
    /// `[a-z0-9_]`.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let key = raw.trim().to_ascii_lowercase();
        if key.is_empty() {
            Err(TaskDomainError::EmptyWorkerName)
        } else if key.len() > MAX_LEN {
            Err(TaskDomainError::WorkerNameTooLong(raw))
        } else if !key.bytes().all(is_key_byte) {
            Err(TaskDomainError::InvalidWorkerName(raw))
        } else {
            Ok(Self(key))
        }
    }

    /// Reads a worker name as the oracle tends to write it.
    ///
    /// Trailing punctuation and surrounding quotes or backticks are
    /// stripped, and hyphens or spaces become underscores, so
    /// `"Graph-Query".` reads as `graph_query`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`WorkerName::new`] for what is left.
    pub fn from_reply(reply: &str) -> Result<Self, TaskDomainError> {
        let bare = reply
            .trim()
            .trim_end_matches(['.', ',', ';', ':', '!'])
            .trim_matches(['"', '\'', '`']);
        let key: String = bare
            .trim()
            .chars()
            .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
            .collect();
        Self::new(key)
    }

    /// Whether the name is a routing target such as `planner` or `__end__`
    /// that no worker may register under.
    #[must_use]
    pub fn is_routing_keyword(&self) -> bool {
        ROUTING_KEYWORDS.contains(&self.0.as_str())
    }

    /// Returns the worker name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

const fn is_key_byte(byte: u8) -> bool {
    byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_'
}

impl TryFrom<String> for WorkerName {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkerName> for String {
    fn from(value: WorkerName) -> Self {
        value.0
    }
}

impl AsRef<str> for WorkerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WorkerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
