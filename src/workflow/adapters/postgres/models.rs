//! Diesel row models for workflow checkpoints.

use super::schema::workflow_checkpoints;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for a checkpoint.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workflow_checkpoints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CheckpointRow {
    /// Session key.
    pub session_id: String,
    /// Serialized workflow state.
    pub state: Value,
    /// Last save timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for a checkpoint.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workflow_checkpoints)]
pub struct NewCheckpointRow {
    /// Session key.
    pub session_id: String,
    /// Serialized workflow state.
    pub state: Value,
    /// Save timestamp.
    pub updated_at: DateTime<Utc>,
}
