//! Session identity, history and concurrency across runs.

use std::sync::Arc;
use std::time::Duration;

use corridor::workflow::{
    RunRequest, SessionPolicy, WorkflowConfig, WorkflowEngineError,
    adapters::InMemoryCheckpointStore, domain::SessionId, ports::CheckpointStore,
};
use eyre::ensure;
use rstest::rstest;

use super::helpers::{EchoWorker, FixedOracle, build_engine, registry_with, store};

#[rstest]
#[case::placeholder(Some("string"))]
#[case::blank(Some("   "))]
#[case::missing(None)]
#[tokio::test(flavor = "multi_thread")]
async fn placeholder_session_ids_are_replaced(
    store: InMemoryCheckpointStore,
    #[case] supplied: Option<&str>,
) -> eyre::Result<()> {
    let oracle = Arc::new(FixedOracle::routing_to("general_qa"));
    let engine = build_engine(
        &oracle,
        registry_with(EchoWorker::new("general"))?,
        &store,
        WorkflowConfig::default(),
    )?;
    let request = supplied.map_or_else(
        || RunRequest::new("hello there"),
        |id| RunRequest::new("hello there").with_session(id),
    );

    let outcome = engine.run_workflow(request).await?;

    let session = outcome.session_id().as_str();
    ensure!(!session.trim().is_empty(), "session id must be generated");
    ensure!(session != "string", "placeholder id must be replaced");
    ensure!(store.load(outcome.session_id()).await?.is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn follow_up_request_sees_previous_exchange(
    store: InMemoryCheckpointStore,
) -> eyre::Result<()> {
    let oracle = Arc::new(FixedOracle::routing_to("general_qa"));
    let engine = build_engine(
        &oracle,
        registry_with(EchoWorker::new("general"))?,
        &store,
        WorkflowConfig::default(),
    )?;

    engine
        .run_workflow(RunRequest::new("What is a Method node?").with_session("s-follow"))
        .await?;
    let outcome = engine
        .run_workflow(RunRequest::new("And what are its keys?").with_session("s-follow"))
        .await?;

    ensure!(outcome.is_success());
    let prompts = oracle.prompts();
    let last = prompts
        .last()
        .ok_or_else(|| eyre::eyre!("oracle was never consulted"))?;
    ensure!(
        last.contains("What is a Method node?"),
        "history missing from prompt: {last}"
    );
    let saved = store
        .load(&SessionId::normalize(Some("s-follow")))
        .await?
        .ok_or_else(|| eyre::eyre!("session was not checkpointed"))?;
    ensure!(saved.conversation_history().len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn distinct_sessions_run_concurrently(store: InMemoryCheckpointStore) -> eyre::Result<()> {
    let oracle = Arc::new(FixedOracle::routing_to("general_qa"));
    let engine = build_engine(
        &oracle,
        registry_with(EchoWorker::new("general").with_delay(Duration::from_millis(50)))?,
        &store,
        WorkflowConfig::default(),
    )?;

    let (first, second) = tokio::join!(
        engine.run_workflow(RunRequest::new("hello from alpha").with_session("alpha")),
        engine.run_workflow(RunRequest::new("hello from beta").with_session("beta")),
    );

    ensure!(first?.final_result() == Some("general: hello from alpha"));
    ensure!(second?.final_result() == Some("general: hello from beta"));
    ensure!(store.session_count()? == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn busy_session_is_rejected_under_reject_policy(
    store: InMemoryCheckpointStore,
) -> eyre::Result<()> {
    let oracle = Arc::new(FixedOracle::routing_to("general_qa"));
    let config = WorkflowConfig {
        session_policy: SessionPolicy::Reject,
        ..WorkflowConfig::default()
    };
    let engine = build_engine(
        &oracle,
        registry_with(EchoWorker::new("general").with_delay(Duration::from_millis(300)))?,
        &store,
        config,
    )?;

    let (first, second) = tokio::join!(
        engine.run_workflow(RunRequest::new("hello there").with_session("shared")),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            engine
                .run_workflow(RunRequest::new("hello again").with_session("shared"))
                .await
        },
    );

    ensure!(first?.is_success());
    ensure!(
        matches!(second, Err(WorkflowEngineError::SessionBusy(ref id)) if id.as_str() == "shared"),
        "expected SessionBusy, got {second:?}"
    );
    Ok(())
}
