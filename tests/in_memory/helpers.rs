//! Shared collaborators for in-memory workflow integration tests.

use async_trait::async_trait;
use corridor::guardrail::{GuardrailConfig, GuardrailManager};
use corridor::intent::IntentClassifier;
use corridor::workflow::{
    WorkflowConfig, WorkflowEngine,
    adapters::InMemoryCheckpointStore,
    ports::{
        OracleError, OraclePrompt, PlanningOracle, Worker, WorkerAssignment, WorkerError,
        WorkerReport,
    },
    services::{WorkerProfile, WorkerRegistry},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Engine type exercised by the integration suites.
pub type TestEngine = WorkflowEngine<FixedOracle, InMemoryCheckpointStore, DefaultClock>;

/// Oracle that answers every call with the same route and plan replies.
pub struct FixedOracle {
    route: String,
    plan: String,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FixedOracle {
    /// Creates an oracle with fixed replies.
    #[must_use]
    pub fn new(route: &str, plan: &str) -> Self {
        Self {
            route: route.to_owned(),
            plan: plan.to_owned(),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Oracle that always routes straight to `worker`.
    #[must_use]
    pub fn routing_to(worker: &str) -> Self {
        Self::new(
            &format!(r#"{{"next_worker": "{worker}", "reasoning": "direct"}}"#),
            r#"{"tasks": [], "reasoning": "unused"}"#,
        )
    }

    /// Number of oracle calls of either kind.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Rendered prompts in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn answer(&self, prompt: &OraclePrompt, reply: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.rendered().to_owned());
        Ok(reply.to_owned())
    }
}

#[async_trait]
impl PlanningOracle for FixedOracle {
    async fn propose_route(&self, prompt: &OraclePrompt) -> Result<String, OracleError> {
        self.answer(prompt, &self.route)
    }

    async fn propose_plan(&self, prompt: &OraclePrompt) -> Result<String, OracleError> {
        self.answer(prompt, &self.plan)
    }
}

/// Worker answering `"<prefix>: <task description>"` after an optional delay.
#[derive(Clone)]
pub struct EchoWorker {
    prefix: String,
    delay: Duration,
}

impl EchoWorker {
    /// Creates an immediate echo worker.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            delay: Duration::ZERO,
        }
    }

    /// Delays every answer by `delay`.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Worker for EchoWorker {
    async fn execute(&self, assignment: &WorkerAssignment) -> Result<WorkerReport, WorkerError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(WorkerReport::completed(format!(
            "{}: {}",
            self.prefix,
            assignment.description()
        ))
        .with_tool_call("echo"))
    }
}

/// Registry with a `general_qa` worker and a `metadata_query` echo worker.
///
/// # Errors
///
/// Returns an error when a worker name is rejected.
pub fn registry_with(general: EchoWorker) -> eyre::Result<WorkerRegistry> {
    let general_worker: Arc<dyn Worker> = Arc::new(general);
    let metadata_worker: Arc<dyn Worker> = Arc::new(EchoWorker::new("metadata"));
    Ok(WorkerRegistry::builder()
        .register(
            "general_qa",
            WorkerProfile::new("Answers general questions").with_capabilities(["conversation"]),
            general_worker,
        )?
        .register(
            "metadata_query",
            WorkerProfile::new("Looks up node and property metadata")
                .with_use_cases(["Find the keys of a node"]),
            metadata_worker,
        )?
        .build())
}

/// Builds an engine with default guardrails over a shared in-memory store.
///
/// # Errors
///
/// Returns an error when the classifier or guardrails cannot be built.
pub fn build_engine(
    oracle: &Arc<FixedOracle>,
    registry: WorkerRegistry,
    store: &InMemoryCheckpointStore,
    config: WorkflowConfig,
) -> eyre::Result<TestEngine> {
    let classifier = Arc::new(IntentClassifier::new()?);
    let guardrails =
        GuardrailManager::from_config(&GuardrailConfig::default(), Arc::clone(&classifier))?;
    Ok(WorkflowEngine::new(
        Arc::clone(oracle),
        Arc::new(registry),
        Arc::new(guardrails),
        classifier,
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
        config,
    ))
}

/// Provides a fresh checkpoint store for each test.
#[fixture]
pub fn store() -> InMemoryCheckpointStore {
    InMemoryCheckpointStore::new()
}
