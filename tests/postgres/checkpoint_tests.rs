//! Save, overwrite and load behaviour of the `PostgreSQL` checkpoint store.

use crate::postgres::helpers::{temporary_database, test_runtime};
use corridor::task::domain::{Task, TaskList, WorkerName};
use corridor::workflow::{
    domain::{SessionId, WorkflowState},
    ports::CheckpointStore,
};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use eyre::{OptionExt, ensure};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

fn planned_state(session: &str) -> eyre::Result<WorkflowState> {
    let mut state = WorkflowState::new(
        SessionId::normalize(Some(session)),
        "Count the Parser methods and summarise them",
        &DefaultClock,
    );
    state.set_task_list(TaskList::new(
        vec![
            Task::new(WorkerName::new("graph_query")?, "count Parser methods"),
            Task::new(WorkerName::new("general_qa")?, "summarise them"),
        ],
        "count then summarise",
    ));
    state.push_message("user", "Count the Parser methods and summarise them");
    Ok(state)
}

fn rows_for(conn: &mut PgConnection, session: &str) -> eyre::Result<i64> {
    let row = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM workflow_checkpoints WHERE session_id = $1",
    )
    .bind::<Text, _>(session)
    .get_result::<CountRow>(conn)?;
    Ok(row.count)
}

#[rstest]
fn saved_state_loads_back_unchanged(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = temporary_database(shared_test_cluster)?;
    let store = database.store()?;
    let state = planned_state("pg-roundtrip")?;
    let rt = test_runtime()?;

    rt.block_on(store.save(&state))?;
    let loaded = rt
        .block_on(store.load(state.session_id()))?
        .ok_or_eyre("checkpoint missing after save")?;

    ensure!(loaded == state, "loaded state differs from saved state");
    Ok(())
}

#[rstest]
fn saving_a_session_again_overwrites_its_checkpoint(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = temporary_database(shared_test_cluster)?;
    let store = database.store()?;
    let mut state = planned_state("pg-overwrite")?;
    let rt = test_runtime()?;

    rt.block_on(store.save(&state))?;
    state.push_message("graph_query", "Parser has 14 methods");
    state.finish("Parser has 14 methods, mostly token handling.");
    state.record_conversation(&DefaultClock);
    rt.block_on(store.save(&state))?;

    let loaded = rt
        .block_on(store.load(state.session_id()))?
        .ok_or_eyre("checkpoint missing after overwrite")?;
    ensure!(loaded == state, "second save did not replace the first");
    ensure!(loaded.final_result() == Some("Parser has 14 methods, mostly token handling."));
    ensure!(loaded.conversation_history().len() == 1);

    let mut conn = database.connect()?;
    ensure!(rows_for(&mut conn, "pg-overwrite")? == 1);
    Ok(())
}

#[rstest]
fn sessions_are_checkpointed_independently(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let database = temporary_database(shared_test_cluster)?;
    let store = database.store()?;
    let first = planned_state("pg-alpha")?;
    let second = WorkflowState::new(
        SessionId::normalize(Some("pg-beta")),
        "What is a Method node?",
        &DefaultClock,
    );
    let rt = test_runtime()?;

    rt.block_on(store.save(&first))?;
    rt.block_on(store.save(&second))?;

    let loaded_first = rt.block_on(store.load(first.session_id()))?;
    let loaded_second = rt.block_on(store.load(second.session_id()))?;
    ensure!(loaded_first.as_ref() == Some(&first));
    ensure!(loaded_second.as_ref() == Some(&second));
    Ok(())
}

#[rstest]
fn unknown_session_loads_as_none(shared_test_cluster: &'static TestCluster) -> eyre::Result<()> {
    let database = temporary_database(shared_test_cluster)?;
    let store = database.store()?;
    let rt = test_runtime()?;

    let loaded = rt.block_on(store.load(&SessionId::normalize(Some("pg-missing"))))?;

    ensure!(loaded.is_none());
    Ok(())
}
