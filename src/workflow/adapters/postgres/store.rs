//! `PostgreSQL` checkpoint store.

use super::{
    models::{CheckpointRow, NewCheckpointRow},
    schema::workflow_checkpoints,
};
use crate::workflow::{
    domain::{SessionId, WorkflowState},
    ports::{CheckpointError, CheckpointResult, CheckpointStore},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::upsert::excluded;

/// `PostgreSQL` connection pool type used by the checkpoint store.
pub type CheckpointPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed checkpoint store keeping one JSONB row per session.
#[derive(Debug, Clone)]
pub struct PostgresCheckpointStore {
    pool: CheckpointPgPool,
}

impl PostgresCheckpointStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: CheckpointPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> CheckpointResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CheckpointResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(CheckpointError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(CheckpointError::persistence)?
    }
}

#[async_trait]
impl CheckpointStore for PostgresCheckpointStore {
    async fn load(&self, session_id: &SessionId) -> CheckpointResult<Option<WorkflowState>> {
        let key = session_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = workflow_checkpoints::table
                .filter(workflow_checkpoints::session_id.eq(&key))
                .select(CheckpointRow::as_select())
                .first::<CheckpointRow>(connection)
                .optional()
                .map_err(CheckpointError::persistence)?;
            row.map(|found| {
                serde_json::from_value(found.state).map_err(CheckpointError::persistence)
            })
            .transpose()
        })
        .await
    }

    async fn save(&self, state: &WorkflowState) -> CheckpointResult<()> {
        let row = NewCheckpointRow {
            session_id: state.session_id().as_str().to_owned(),
            state: serde_json::to_value(state).map_err(CheckpointError::persistence)?,
            updated_at: state.updated_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(workflow_checkpoints::table)
                .values(&row)
                .on_conflict(workflow_checkpoints::session_id)
                .do_update()
                .set((
                    workflow_checkpoints::state.eq(excluded(workflow_checkpoints::state)),
                    workflow_checkpoints::updated_at.eq(excluded(workflow_checkpoints::updated_at)),
                ))
                .execute(connection)
                .map_err(CheckpointError::persistence)?;
            Ok(())
        })
        .await
    }
}
