//! Scripted collaborators shared by workflow unit tests.

use crate::guardrail::{GuardrailConfig, GuardrailManager};
use crate::intent::IntentClassifier;
use crate::workflow::{
    WorkflowConfig, WorkflowEngine,
    adapters::InMemoryCheckpointStore,
    domain::TokenUsage,
    ports::{
        CheckpointStore, OracleError, OraclePrompt, PlanningOracle, Worker, WorkerAssignment,
        WorkerError, WorkerReport,
    },
    services::{WorkerProfile, WorkerRegistry},
};
use async_trait::async_trait;
use mockable::DefaultClock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Oracle replaying canned replies in order.
#[derive(Default)]
pub(super) struct ScriptedOracle {
    routes: Mutex<VecDeque<Result<String, OracleError>>>,
    plans: Mutex<VecDeque<Result<String, OracleError>>>,
    prompts: Mutex<Vec<String>>,
    route_calls: AtomicUsize,
    plan_calls: AtomicUsize,
}

impl ScriptedOracle {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn route(self, reply: &str) -> Self {
        push(&self.routes, Ok(reply.to_owned()));
        self
    }

    pub(super) fn route_error(self) -> Self {
        push(&self.routes, Err(OracleError::Unavailable("rate limited".to_owned())));
        self
    }

    pub(super) fn plan(self, reply: &str) -> Self {
        push(&self.plans, Ok(reply.to_owned()));
        self
    }

    pub(super) fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }

    pub(super) fn plan_calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next(
        &self,
        queue: &Mutex<VecDeque<Result<String, OracleError>>>,
        prompt: &OraclePrompt,
    ) -> Result<String, OracleError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.rendered().to_owned());
        queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Unavailable("script exhausted".to_owned())))
    }
}

fn push(
    queue: &Mutex<VecDeque<Result<String, OracleError>>>,
    reply: Result<String, OracleError>,
) {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(reply);
}

#[async_trait]
impl PlanningOracle for ScriptedOracle {
    async fn propose_route(&self, prompt: &OraclePrompt) -> Result<String, OracleError> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        self.next(&self.routes, prompt)
    }

    async fn propose_plan(&self, prompt: &OraclePrompt) -> Result<String, OracleError> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        self.next(&self.plans, prompt)
    }
}

#[derive(Clone)]
enum Reply {
    Answer(String),
    Report(String),
    Raise(String),
    Crash(String),
    Stall(Duration),
}

/// Worker with a fixed behaviour that counts its executions.
#[derive(Clone)]
pub(super) struct StubWorker {
    reply: Reply,
    tools: Vec<String>,
    tokens: TokenUsage,
    executions: Arc<AtomicUsize>,
}

impl StubWorker {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            tools: Vec::new(),
            tokens: TokenUsage::default(),
            executions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(super) fn answering(text: &str) -> Self {
        Self::with_reply(Reply::Answer(text.to_owned()))
    }

    pub(super) fn reporting_failure(error: &str) -> Self {
        Self::with_reply(Reply::Report(error.to_owned()))
    }

    pub(super) fn raising(error: &str) -> Self {
        Self::with_reply(Reply::Raise(error.to_owned()))
    }

    pub(super) fn crashing(message: &str) -> Self {
        Self::with_reply(Reply::Crash(message.to_owned()))
    }

    pub(super) fn stalling(delay: Duration) -> Self {
        Self::with_reply(Reply::Stall(delay))
    }

    pub(super) fn with_tool(mut self, tool: &str) -> Self {
        self.tools.push(tool.to_owned());
        self
    }

    pub(super) const fn with_tokens(mut self, tokens: TokenUsage) -> Self {
        self.tokens = tokens;
        self
    }

    pub(super) fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Worker for StubWorker {
    async fn execute(&self, _assignment: &WorkerAssignment) -> Result<WorkerReport, WorkerError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let report = match &self.reply {
            Reply::Answer(text) => WorkerReport::completed(text.clone()),
            Reply::Report(error) => WorkerReport::failed(error.clone()),
            Reply::Raise(error) => return Err(WorkerError::Execution(error.clone())),
            Reply::Crash(message) => std::panic::panic_any(message.clone()),
            Reply::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                WorkerReport::completed("too late")
            }
        };
        Ok(self
            .tools
            .iter()
            .fold(report, |acc, tool| acc.with_tool_call(tool.clone()))
            .with_tokens(self.tokens))
    }
}

/// Registry of `(name, worker)` pairs with placeholder profiles.
pub(super) fn registry(workers: &[(&str, &StubWorker)]) -> eyre::Result<WorkerRegistry> {
    let mut builder = WorkerRegistry::builder();
    for (name, worker) in workers {
        let stub: Arc<dyn Worker> = Arc::new((*worker).clone());
        builder = builder.register(*name, WorkerProfile::new(format!("{name} worker")), stub)?;
    }
    Ok(builder.build())
}

pub(super) type TestEngine<S> = WorkflowEngine<ScriptedOracle, S, DefaultClock>;

/// Engine over the given store with default guardrails.
pub(super) fn engine_with_store<S: CheckpointStore>(
    oracle: &Arc<ScriptedOracle>,
    registry: WorkerRegistry,
    store: S,
    config: WorkflowConfig,
) -> eyre::Result<TestEngine<S>> {
    let classifier = Arc::new(IntentClassifier::new()?);
    let guardrails =
        GuardrailManager::from_config(&GuardrailConfig::default(), Arc::clone(&classifier))?;
    Ok(WorkflowEngine::new(
        Arc::clone(oracle),
        Arc::new(registry),
        Arc::new(guardrails),
        classifier,
        Arc::new(store),
        Arc::new(DefaultClock),
        config,
    ))
}

/// Engine over an in-memory store with default guardrails.
pub(super) fn engine(
    oracle: &Arc<ScriptedOracle>,
    registry: WorkerRegistry,
    config: WorkflowConfig,
) -> eyre::Result<TestEngine<InMemoryCheckpointStore>> {
    engine_with_store(oracle, registry, InMemoryCheckpointStore::new(), config)
}
