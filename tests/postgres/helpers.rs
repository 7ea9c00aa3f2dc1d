//! Shared helpers for `PostgreSQL` checkpoint store tests.

use corridor::workflow::adapters::postgres::PostgresCheckpointStore;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use tracing::warn;
use uuid::Uuid;

/// SQL creating the checkpoint table.
pub const CREATE_CHECKPOINTS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_workflow_checkpoints/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "corridor_test_template";

/// Creates a runtime for driving the async store from synchronous tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> eyre::Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Ensures the template database exists with the checkpoint schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> eyre::Result<()> {
    cluster.ensure_template_exists(TEMPLATE_DB, |db_name| {
        let url = cluster.connection().database_url(db_name);
        let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
        conn.batch_execute(CREATE_CHECKPOINTS_SQL)
            .map_err(|e| eyre::eyre!("{e}"))?;
        Ok(())
    })?;
    Ok(())
}

/// Database cloned from the template, dropped again when the value goes out
/// of scope.
pub struct TestDatabase<'a> {
    cluster: &'a TestCluster,
    name: String,
}

impl TestDatabase<'_> {
    /// Builds a checkpoint store over a single-connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built.
    pub fn store(&self) -> eyre::Result<PostgresCheckpointStore> {
        let manager = ConnectionManager::<PgConnection>::new(self.url());
        let pool = Pool::builder().max_size(1).build(manager)?;
        Ok(PostgresCheckpointStore::new(pool))
    }

    /// Opens a direct connection for inspecting rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub fn connect(&self) -> eyre::Result<PgConnection> {
        Ok(PgConnection::establish(&self.url())?)
    }

    fn url(&self) -> String {
        self.cluster.connection().database_url(&self.name)
    }
}

impl Drop for TestDatabase<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(self.name.as_str()) {
            warn!(database = %self.name, error = %err, "failed to drop test database");
        }
    }
}

/// Creates a fresh database from the migrated template.
///
/// # Errors
///
/// Returns an error if the template or the database cannot be created.
pub fn temporary_database(cluster: &TestCluster) -> eyre::Result<TestDatabase<'_>> {
    ensure_template(cluster)?;
    let name = format!("corridor_test_{}", Uuid::new_v4().simple());
    cluster.create_database_from_template(name.as_str(), TEMPLATE_DB)?;
    Ok(TestDatabase { cluster, name })
}
