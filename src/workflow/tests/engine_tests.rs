//! Unit tests for the workflow run loop.

use super::support::{ScriptedOracle, StubWorker, engine, engine_with_store, registry};
use crate::guardrail::{GuardrailPhase, Severity};
use crate::task::domain::TaskStatus;
use crate::workflow::{
    RunRequest, WorkflowConfig,
    domain::{SessionId, TECHNICAL_DIFFICULTIES, TokenUsage, WorkflowFailure, WorkflowState},
    ports::{CheckpointError, CheckpointResult, CheckpointStore},
};
use async_trait::async_trait;
use eyre::{OptionExt, ensure};
use mockall::mock;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

mock! {
    Store {}

    #[async_trait]
    impl CheckpointStore for Store {
        async fn load(&self, session_id: &SessionId) -> CheckpointResult<Option<WorkflowState>>;
        async fn save(&self, state: &WorkflowState) -> CheckpointResult<()>;
        async fn flush(&self) -> CheckpointResult<()>;
    }
}

const ROUTE_TO_GRAPH: &str = "{\"next_worker\": \"graph_query\", \"reasoning\": \"lookup\"}";
const ROUTE_TO_PLANNER: &str = "{\"next_worker\": \"planner\", \"reasoning\": \"several steps\"}";

fn store_down() -> CheckpointError {
    CheckpointError::persistence(std::io::Error::other("database unavailable"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn routed_request_returns_worker_result() -> eyre::Result<()> {
    let graph = StubWorker::answering("There are 42 classes in the project.")
        .with_tool("cypher")
        .with_tool("cypher")
        .with_tokens(TokenUsage::new(100, 20));
    let oracle = Arc::new(ScriptedOracle::new().route(ROUTE_TO_GRAPH));
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, WorkflowConfig::default())?;

    let outcome = engine
        .run_workflow(RunRequest::new("How many classes are there?"))
        .await?;

    ensure!(outcome.is_success());
    ensure!(outcome.final_result() == Some("There are 42 classes in the project."));
    ensure!(outcome.usage().node_count("graph_query") == 1);
    ensure!(outcome.usage().node_count("supervisor") == 2);
    ensure!(outcome.usage().tool_count("cypher") == 2);
    ensure!(outcome.usage().tokens().total() == 120);
    ensure!(outcome.verdicts().iter().all(|verdict| verdict.passed()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ghost_worker_is_never_executed() -> eyre::Result<()> {
    let graph = StubWorker::answering("There are 42 classes in the project.");
    let oracle = Arc::new(
        ScriptedOracle::new().route("{\"next_worker\": \"ghost_worker\", \"reasoning\": \"?\"}"),
    );
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, WorkflowConfig::default())?;

    let outcome = engine
        .run_workflow(RunRequest::new("How many classes are there?"))
        .await?;

    ensure!(matches!(
        outcome.failure(),
        Some(WorkflowFailure::UnknownWorker { name }) if name == "ghost_worker"
    ));
    ensure!(graph.executions() == 0);
    ensure!(outcome.final_result().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_worker_times_out() -> eyre::Result<()> {
    let slow = StubWorker::stalling(Duration::from_secs(5));
    let oracle = Arc::new(ScriptedOracle::new().route(ROUTE_TO_GRAPH));
    let config = WorkflowConfig {
        worker_timeout: Duration::from_millis(50),
        ..WorkflowConfig::default()
    };
    let engine = engine(&oracle, registry(&[("graph_query", &slow)])?, config)?;

    let outcome = engine
        .run_workflow(RunRequest::new("How many classes are there?"))
        .await?;

    ensure!(outcome.final_result() == Some("Error: timeout"));
    let task = outcome
        .task_list()
        .and_then(|list| list.get(0))
        .ok_or_eyre("task missing")?;
    ensure!(task.status() == TaskStatus::Failed);
    ensure!(task.error() == Some("timeout"));
    Ok(())
}

#[rstest]
#[case::reported(StubWorker::reporting_failure("graph database offline"))]
#[case::raised(StubWorker::raising("graph database offline"))]
#[tokio::test(flavor = "multi_thread")]
async fn worker_errors_land_in_the_result(#[case] worker: StubWorker) -> eyre::Result<()> {
    let oracle = Arc::new(ScriptedOracle::new().route(ROUTE_TO_GRAPH));
    let engine = engine(&oracle, registry(&[("graph_query", &worker)])?, WorkflowConfig::default())?;

    let outcome = engine
        .run_workflow(RunRequest::new("How many classes are there?"))
        .await?;

    ensure!(outcome.final_result() == Some("Error: graph database offline"));
    ensure!(outcome.failure().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn planned_tasks_run_in_order() -> eyre::Result<()> {
    let graph = StubWorker::answering("The Parser class has 12 methods.");
    let general = StubWorker::answering("Most of those methods handle tokens.");
    let oracle = Arc::new(
        ScriptedOracle::new().route(ROUTE_TO_PLANNER).plan(
            "{\"tasks\": [\
                {\"worker\": \"graph_query\", \"description\": \"count Parser methods\"},\
                {\"agent\": \"general_qa\", \"description\": \"summarise them\"}\
             ], \"reasoning\": \"lookup then explain\"}",
        ),
    );
    let engine = engine(
        &oracle,
        registry(&[("graph_query", &graph), ("general_qa", &general)])?,
        WorkflowConfig::default(),
    )?;

    let outcome = engine
        .run_workflow(RunRequest::new("Count the Parser methods and summarise them"))
        .await?;

    ensure!(
        outcome.final_result()
            == Some("The Parser class has 12 methods.\nMost of those methods handle tokens.")
    );
    ensure!(outcome.usage().node_count("planner") == 1);
    ensure!(graph.executions() == 1 && general.executions() == 1);
    ensure!(
        outcome
            .messages()
            .iter()
            .any(|m| m.role() == "planner" && m.content().contains("2 tasks"))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn planner_is_retried_after_unusable_reply() -> eyre::Result<()> {
    let graph = StubWorker::answering("The Parser class has 12 methods.");
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route(ROUTE_TO_PLANNER)
            .plan("Here is my plan: first count, then explain.")
            .plan("{\"tasks\": [{\"worker\": \"graph_query\", \"description\": \"count\"}]}"),
    );
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, WorkflowConfig::default())?;

    let outcome = engine
        .run_workflow(RunRequest::new("Count the Parser methods"))
        .await?;

    ensure!(outcome.final_result() == Some("The Parser class has 12 methods."));
    ensure!(oracle.plan_calls() == 2);
    ensure!(oracle.route_calls() == 1);
    let retry_prompt = oracle.prompts().last().cloned().unwrap_or_default();
    ensure!(retry_prompt.contains("Your previous reply could not be used"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn planner_gives_up_after_three_attempts() -> eyre::Result<()> {
    let graph = StubWorker::answering("unused");
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route(ROUTE_TO_PLANNER)
            .plan("not json")
            .plan("still not json")
            .plan("{\"tasks\": \"wrong shape\"}"),
    );
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, WorkflowConfig::default())?;

    let outcome = engine
        .run_workflow(RunRequest::new("Compare the payments and billing modules"))
        .await?;

    ensure!(outcome.final_result() == Some(TECHNICAL_DIFFICULTIES));
    ensure!(matches!(
        outcome.failure(),
        Some(WorkflowFailure::RoutingParseFailure { .. })
    ));
    ensure!(oracle.plan_calls() == 3);
    ensure!(graph.executions() == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn iteration_limit_stops_the_loop() -> eyre::Result<()> {
    let graph = StubWorker::answering("The Parser class has 12 methods.");
    let oracle = Arc::new(ScriptedOracle::new().route(ROUTE_TO_PLANNER).plan("nope"));
    let config = WorkflowConfig {
        max_iterations: 1,
        ..WorkflowConfig::default()
    };
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, config)?;

    let outcome = engine
        .run_workflow(RunRequest::new("Count the Parser methods"))
        .await?;

    ensure!(outcome.failure() == Some(&WorkflowFailure::IterationLimit { limit: 1 }));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_input_never_reaches_the_oracle() -> eyre::Result<()> {
    let graph = StubWorker::answering("unused");
    let oracle = Arc::new(ScriptedOracle::new().route(ROUTE_TO_GRAPH));
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, WorkflowConfig::default())?;

    let outcome = engine
        .run_workflow(RunRequest::new("Drop the entire database"))
        .await?;

    ensure!(matches!(
        outcome.failure(),
        Some(WorkflowFailure::ValidationFailure {
            phase: GuardrailPhase::Input,
            severity: Severity::Critical,
            ..
        })
    ));
    ensure!(oracle.route_calls() == 0);
    ensure!(graph.executions() == 0);
    ensure!(outcome.verdicts().len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bypass_skips_both_phases() -> eyre::Result<()> {
    let graph = StubWorker::answering("done");
    let oracle = Arc::new(ScriptedOracle::new().route(ROUTE_TO_GRAPH));
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, WorkflowConfig::default())?;

    let outcome = engine
        .run_workflow(RunRequest::new("Drop the entire database").bypass_guardrails())
        .await?;

    ensure!(outcome.final_result() == Some("done"));
    ensure!(outcome.verdicts().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn leaking_result_is_withheld() -> eyre::Result<()> {
    let graph = StubWorker::answering("The admin password: hunter22");
    let oracle = Arc::new(ScriptedOracle::new().route(ROUTE_TO_GRAPH));
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, WorkflowConfig::default())?;

    let outcome = engine
        .run_workflow(RunRequest::new("What is the admin login?"))
        .await?;

    ensure!(outcome.final_result().is_none());
    ensure!(matches!(
        outcome.failure(),
        Some(WorkflowFailure::ValidationFailure {
            phase: GuardrailPhase::Output,
            check,
            ..
        }) if check == "output_safety"
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn checkpoint_failures_do_not_abort_the_run() -> eyre::Result<()> {
    let mut store = MockStore::new();
    store.expect_load().returning(|_| Err(store_down()));
    store.expect_save().returning(|_| Err(store_down()));
    store.expect_flush().times(1).returning(|| Err(store_down()));
    let graph = StubWorker::answering("There are 42 classes in the project.");
    let oracle = Arc::new(ScriptedOracle::new().route(ROUTE_TO_GRAPH));
    let engine = engine_with_store(
        &oracle,
        registry(&[("graph_query", &graph)])?,
        store,
        WorkflowConfig::default(),
    )?;

    let outcome = engine
        .run_workflow(RunRequest::new("How many classes are there?"))
        .await?;

    ensure!(outcome.is_success());
    ensure!(engine.shutdown().await.is_err());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn follow_up_sees_previous_exchange() -> eyre::Result<()> {
    let graph = StubWorker::answering("There are 42 classes in the project.");
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route(ROUTE_TO_GRAPH)
            .route(ROUTE_TO_GRAPH),
    );
    let engine = engine(&oracle, registry(&[("graph_query", &graph)])?, WorkflowConfig::default())?;

    let first = engine
        .run_workflow(RunRequest::new("How many classes are there?"))
        .await?;
    engine
        .run_workflow(
            RunRequest::new("And how many are abstract?").with_session(first.session_id().as_str()),
        )
        .await?;

    let second_prompt = oracle.prompts().last().cloned().unwrap_or_default();
    ensure!(second_prompt.contains("Q1: How many classes are there?"));
    ensure!(second_prompt.contains("A1: There are 42 classes in the project."));
    Ok(())
}

const TWO_TASK_PLAN: &str = "{\"tasks\": [\
    {\"worker\": \"graph_query\", \"description\": \"count Parser methods\"},\
    {\"worker\": \"general_qa\", \"description\": \"summarise them\"}\
 ], \"reasoning\": \"lookup then explain\"}";

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn panicking_worker_fails_only_its_task() -> eyre::Result<()> {
    let graph = StubWorker::crashing("graph driver exploded");
    let general = StubWorker::answering("Most of those methods handle tokens.");
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route(ROUTE_TO_PLANNER)
            .plan(TWO_TASK_PLAN),
    );
    let engine = engine(
        &oracle,
        registry(&[("graph_query", &graph), ("general_qa", &general)])?,
        WorkflowConfig::default(),
    )?;

    let outcome = engine
        .run_workflow(RunRequest::new("Count the Parser methods and summarise them"))
        .await?;

    ensure!(outcome.failure().is_none());
    ensure!(
        outcome.final_result()
            == Some("Error: worker panicked\nMost of those methods handle tokens.")
    );
    ensure!(graph.executions() == 1 && general.executions() == 1);
    let tasks = outcome.task_list().ok_or_eyre("task list missing")?;
    ensure!(tasks.count_with_status(TaskStatus::Failed) == 1);
    ensure!(tasks.count_with_status(TaskStatus::Completed) == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_checkpoint_has_at_most_one_active_task() -> eyre::Result<()> {
    let snapshots: Arc<std::sync::Mutex<Vec<WorkflowState>>> = Arc::default();
    let recorded = Arc::clone(&snapshots);
    let mut store = MockStore::new();
    store.expect_load().returning(|_| Ok(None));
    store.expect_save().returning(move |state| {
        recorded
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(state.clone());
        Ok(())
    });
    let graph = StubWorker::answering("The Parser class has 12 methods.");
    let general = StubWorker::answering("Most of those methods handle tokens.");
    let oracle = Arc::new(
        ScriptedOracle::new()
            .route(ROUTE_TO_PLANNER)
            .plan(TWO_TASK_PLAN),
    );
    let engine = engine_with_store(
        &oracle,
        registry(&[("graph_query", &graph), ("general_qa", &general)])?,
        store,
        WorkflowConfig::default(),
    )?;

    let outcome = engine
        .run_workflow(RunRequest::new("Count the Parser methods and summarise them"))
        .await?;

    ensure!(outcome.is_success());
    let saved = snapshots
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone();
    let planned: Vec<_> = saved.iter().filter_map(WorkflowState::task_list).collect();
    ensure!(planned.len() >= 3, "expected a checkpoint per step, got {}", saved.len());
    for list in planned {
        ensure!(list.count_with_status(TaskStatus::InProgress) <= 1);
    }
    Ok(())
}
