//! Session identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Placeholder some HTTP clients send when the field is left at its
/// schema default.
const PLACEHOLDER: &str = "string";

/// Key of a conversation spanning several workflow runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random session identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Uses `candidate` when it is a real identifier, otherwise generates one.
    ///
    /// Blank values and the literal `"string"` are treated as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use corridor::workflow::domain::SessionId;
    ///
    /// assert_eq!(SessionId::normalize(Some("abc")).as_str(), "abc");
    /// assert_ne!(SessionId::normalize(Some("string")).as_str(), "string");
    /// ```
    #[must_use]
    pub fn normalize(candidate: Option<&str>) -> Self {
        match candidate.map(str::trim) {
            Some(value) if !value.is_empty() && value != PLACEHOLDER => Self(value.to_owned()),
            _ => Self::generate(),
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
