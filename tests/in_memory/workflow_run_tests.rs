//! End-to-end runs through guardrails, routing and workers.

use std::sync::Arc;

use corridor::guardrail::{GuardrailPhase, Severity};
use corridor::task::domain::TaskStatus;
use corridor::workflow::{
    RunRequest, WorkflowConfig,
    adapters::InMemoryCheckpointStore,
    domain::{NO_TASKS, WorkflowFailure},
};
use eyre::ensure;
use rstest::rstest;

use super::helpers::{EchoWorker, FixedOracle, build_engine, registry_with, store};

const TWO_STEP_PLAN: &str = r#"Here is the plan:
```json
{
  "tasks": [
    {"worker": "metadata_query", "description": "List the keys of the Method node"},
    {"worker": "general_qa", "description": "Explain what the keys mean"}
  ],
  "reasoning": "look up then explain"
}
```"#;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn metadata_question_passes_guardrails_and_reaches_worker(
    store: InMemoryCheckpointStore,
) -> eyre::Result<()> {
    let oracle = Arc::new(FixedOracle::routing_to("metadata_query"));
    let engine = build_engine(
        &oracle,
        registry_with(EchoWorker::new("general"))?,
        &store,
        WorkflowConfig::default(),
    )?;

    let outcome = engine
        .run_workflow(RunRequest::new(
            "Provide keys from the database for the Method node",
        ))
        .await?;

    ensure!(outcome.is_success(), "run failed: {:?}", outcome.failure());
    ensure!(
        outcome.final_result()
            == Some("metadata: Provide keys from the database for the Method node"),
        "unexpected result {:?}",
        outcome.final_result()
    );
    ensure!(outcome.verdicts().iter().all(|verdict| verdict.passed()));
    ensure!(outcome.usage().node_count("metadata_query") == 1);
    ensure!(outcome.usage().tool_count("echo") == 1);
    ensure!(store.session_count()? == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn planned_request_runs_tasks_in_order(store: InMemoryCheckpointStore) -> eyre::Result<()> {
    let oracle = Arc::new(FixedOracle::new(
        r#"{"next_worker": "planner", "reasoning": "needs two steps"}"#,
        TWO_STEP_PLAN,
    ));
    let engine = build_engine(
        &oracle,
        registry_with(EchoWorker::new("general"))?,
        &store,
        WorkflowConfig::default(),
    )?;

    let outcome = engine
        .run_workflow(RunRequest::new(
            "Find the keys of the Method node and explain each of them",
        ))
        .await?;

    ensure!(outcome.is_success(), "run failed: {:?}", outcome.failure());
    ensure!(
        outcome.final_result()
            == Some(
                "metadata: List the keys of the Method node\n\
                 general: Explain what the keys mean"
            ),
        "unexpected result {:?}",
        outcome.final_result()
    );
    let tasks = outcome
        .task_list()
        .ok_or_else(|| eyre::eyre!("missing task list"))?;
    ensure!(tasks.len() == 2);
    ensure!(tasks.count_with_status(TaskStatus::Completed) == 2);
    ensure!(tasks.reasoning() == "look up then explain");
    ensure!(outcome.usage().node_count("planner") == 1);
    ensure!(oracle.calls() == 2, "expected one route and one plan call");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn destructive_request_is_rejected_before_routing(
    store: InMemoryCheckpointStore,
) -> eyre::Result<()> {
    let oracle = Arc::new(FixedOracle::routing_to("general_qa"));
    let engine = build_engine(
        &oracle,
        registry_with(EchoWorker::new("general"))?,
        &store,
        WorkflowConfig::default(),
    )?;

    let outcome = engine
        .run_workflow(RunRequest::new("Drop the entire database"))
        .await?;

    ensure!(outcome.final_result().is_none());
    ensure!(
        matches!(
            outcome.failure(),
            Some(WorkflowFailure::ValidationFailure {
                phase: GuardrailPhase::Input,
                severity: Severity::Critical,
                ..
            })
        ),
        "unexpected failure {:?}",
        outcome.failure()
    );
    ensure!(oracle.calls() == 0, "oracle must not be consulted");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn end_route_finishes_without_tasks(store: InMemoryCheckpointStore) -> eyre::Result<()> {
    let oracle = Arc::new(FixedOracle::routing_to("__end__"));
    let engine = build_engine(
        &oracle,
        registry_with(EchoWorker::new("general"))?,
        &store,
        WorkflowConfig::default(),
    )?;

    let outcome = engine
        .run_workflow(RunRequest::new("Nothing further is needed here, thanks"))
        .await?;

    ensure!(outcome.final_result() == Some(NO_TASKS));
    ensure!(outcome.failure().is_none());
    Ok(())
}
