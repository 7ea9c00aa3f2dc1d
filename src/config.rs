//! Top-level configuration loaded from YAML.

use crate::guardrail::{GuardrailConfig, GuardrailError};
use crate::telemetry::LoggingConfig;
use crate::workflow::WorkflowConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid configuration.
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A guardrail setting is out of range.
    #[error(transparent)]
    Guardrail(#[from] GuardrailError),
}

/// Every setting the crate reads, grouped by concern.
///
/// Missing sections and fields take their defaults.
///
/// # Examples
///
/// ```
/// use corridor::config::CorridorConfig;
///
/// let config = CorridorConfig::from_yaml_str(
///     "workflow:\n  worker_timeout: 5s\nguardrails:\n  fail_fast: false\n",
/// )?;
/// assert_eq!(config.workflow.worker_timeout.as_secs(), 5);
/// assert!(!config.guardrails.fail_fast);
/// # Ok::<(), corridor::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorridorConfig {
    /// Workflow limits.
    pub workflow: WorkflowConfig,
    /// Guardrail pipeline.
    pub guardrails: GuardrailConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl CorridorConfig {
    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the YAML is malformed or a guardrail
    /// threshold is out of range.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.guardrails.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let yaml = std::fs::read_to_string(file).map_err(|source| ConfigError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }
}
