//! The workflow loop: validate, route, execute, repeat.

use crate::guardrail::{
    CheckContext, Enforcement, GuardrailManager, GuardrailPhase, GuardrailVerdict,
};
use crate::intent::IntentClassifier;
use crate::task::domain::{TaskList, WorkerName};
use crate::workflow::{
    WorkflowConfig,
    domain::{
        ActiveNode, ConversationEntry, SessionId, UsageStats, WorkflowFailure, WorkflowMessage,
        WorkflowState,
    },
    ports::{
        CheckpointResult, CheckpointStore, PlanningOracle, WorkerAssignment, WorkerOutcome,
        WorkerReport,
    },
    services::{
        PLANNER, Planner, RoutingDecision, SUPERVISOR, SessionGate, Supervisor, WorkerRegistry,
    },
};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Error text recorded on a task whose worker exceeded its deadline.
const TIMEOUT_ERROR: &str = "timeout";

/// Error text recorded on a task whose worker panicked.
const PANIC_ERROR: &str = "worker panicked";

/// Error text recorded on a task whose worker was cancelled by the runtime.
const CANCELLED_ERROR: &str = "worker cancelled";

/// Errors that prevent a run from starting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowEngineError {
    /// Another run holds the session under the reject policy.
    #[error("session {0} is busy")]
    SessionBusy(SessionId),
}

/// Input to [`WorkflowEngine::run_workflow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    text: String,
    session_id: Option<String>,
    enforcement: Enforcement,
}

impl RunRequest {
    /// Creates a guarded request without a session.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: None,
            enforcement: Enforcement::Enforced,
        }
    }

    /// Continues an existing session.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Skips both guardrail phases.
    #[must_use]
    pub const fn bypass_guardrails(mut self) -> Self {
        self.enforcement = Enforcement::Bypassed;
        self
    }

    /// Request text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Session id as supplied, before normalization.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Guardrail enforcement.
    #[must_use]
    pub const fn enforcement(&self) -> Enforcement {
        self.enforcement
    }
}

/// What a finished run reports to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowOutcome {
    session_id: SessionId,
    final_result: Option<String>,
    failure: Option<WorkflowFailure>,
    usage: UsageStats,
    task_list: Option<TaskList>,
    verdicts: Vec<GuardrailVerdict>,
    messages: Vec<WorkflowMessage>,
}

impl WorkflowOutcome {
    fn from_state(state: &WorkflowState, verdicts: Vec<GuardrailVerdict>) -> Self {
        Self {
            session_id: state.session_id().clone(),
            final_result: state.final_result().map(str::to_owned),
            failure: state.failure().cloned(),
            usage: state.usage().clone(),
            task_list: state.task_list().cloned(),
            verdicts,
            messages: state.messages().to_vec(),
        }
    }

    /// Normalized session key; pass it back to continue the conversation.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Final result, absent when a failure suppressed it.
    #[must_use]
    pub fn final_result(&self) -> Option<&str> {
        self.final_result.as_deref()
    }

    /// Failure that ended the run, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&WorkflowFailure> {
        self.failure.as_ref()
    }

    /// Usage counters.
    #[must_use]
    pub const fn usage(&self) -> &UsageStats {
        &self.usage
    }

    /// Plan as executed.
    #[must_use]
    pub const fn task_list(&self) -> Option<&TaskList> {
        self.task_list.as_ref()
    }

    /// Guardrail verdicts from both phases.
    #[must_use]
    pub fn verdicts(&self) -> &[GuardrailVerdict] {
        &self.verdicts
    }

    /// In-run trace.
    #[must_use]
    pub fn messages(&self) -> &[WorkflowMessage] {
        &self.messages
    }

    /// Returns `true` when the run produced a result without failure.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none() && self.final_result.is_some()
    }
}

/// Drives requests through guardrails, routing and workers.
///
/// One engine serves many sessions concurrently; runs within a session are
/// serialised by the session gate.
pub struct WorkflowEngine<O, S, C>
where
    O: PlanningOracle,
    S: CheckpointStore,
    C: Clock + Send + Sync,
{
    supervisor: Supervisor<O>,
    planner: Planner<O>,
    registry: Arc<WorkerRegistry>,
    guardrails: Arc<GuardrailManager>,
    store: Arc<S>,
    clock: Arc<C>,
    gate: SessionGate,
    config: WorkflowConfig,
}

impl<O, S, C> WorkflowEngine<O, S, C>
where
    O: PlanningOracle,
    S: CheckpointStore,
    C: Clock + Send + Sync,
{
    /// Wires an engine from its collaborators.
    #[must_use]
    pub fn new(
        oracle: Arc<O>,
        registry: Arc<WorkerRegistry>,
        guardrails: Arc<GuardrailManager>,
        classifier: Arc<IntentClassifier>,
        store: Arc<S>,
        clock: Arc<C>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            supervisor: Supervisor::new(
                Arc::clone(&oracle),
                Arc::clone(&registry),
                classifier,
                config.clone(),
            ),
            planner: Planner::new(oracle, Arc::clone(&registry), &config),
            registry,
            guardrails,
            store,
            clock,
            gate: SessionGate::new(config.session_policy),
            config,
        }
    }

    /// Runs one request to completion.
    ///
    /// Guardrail rejections, routing failures and worker errors are reported
    /// in the outcome rather than as errors.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowEngineError::SessionBusy`] when the session is
    /// already running under the reject policy.
    pub async fn run_workflow(
        &self,
        request: RunRequest,
    ) -> Result<WorkflowOutcome, WorkflowEngineError> {
        let session_id = SessionId::normalize(request.session_id());
        let _permit = self.gate.acquire(&session_id).await?;

        let history = self.load_history(&session_id).await;
        let mut state = WorkflowState::new(session_id.clone(), request.text(), self.clock.as_ref())
            .with_history(history);
        let context = CheckContext::new()
            .with_request(request.text())
            .with_session(session_id.as_str());

        info!(session_id = %session_id, "workflow started");
        let mut verdicts = self
            .guardrails
            .check(
                request.text(),
                GuardrailPhase::Input,
                &context,
                request.enforcement(),
            )
            .await;
        if let Some(failed) = verdicts.iter().find(|verdict| !verdict.passed()) {
            state.abort(
                WorkflowFailure::from_verdict(GuardrailPhase::Input, failed),
                None,
            );
        } else {
            self.drive(&mut state).await;
        }

        if state.failure().is_none()
            && let Some(result) = state.final_result().map(str::to_owned)
        {
            let output_verdicts = self
                .guardrails
                .check(
                    &result,
                    GuardrailPhase::Output,
                    &context,
                    request.enforcement(),
                )
                .await;
            if let Some(failed) = output_verdicts.iter().find(|verdict| !verdict.passed()) {
                state.abort(
                    WorkflowFailure::from_verdict(GuardrailPhase::Output, failed),
                    None,
                );
            }
            verdicts.extend(output_verdicts);
        }

        state.record_conversation(self.clock.as_ref());
        self.checkpoint(&mut state).await;
        info!(
            session_id = %session_id,
            failure = state.failure().map(WorkflowFailure::kind),
            iterations = state.iterations(),
            "workflow finished"
        );
        Ok(WorkflowOutcome::from_state(&state, verdicts))
    }

    /// Flushes the checkpoint store.
    ///
    /// # Errors
    ///
    /// Returns the store's error when buffered writes cannot be persisted.
    pub async fn shutdown(&self) -> CheckpointResult<()> {
        self.store.flush().await
    }

    async fn drive(&self, state: &mut WorkflowState) {
        loop {
            if state.next_iteration() > self.config.max_iterations {
                warn!(
                    session_id = %state.session_id(),
                    limit = self.config.max_iterations,
                    "iteration limit reached"
                );
                state.abort(
                    WorkflowFailure::IterationLimit {
                        limit: self.config.max_iterations,
                    },
                    None,
                );
                return;
            }
            state.usage_mut().record_node(SUPERVISOR);
            match self.supervisor.decide(state).await {
                RoutingDecision::Terminal => return,
                RoutingDecision::Plan => {
                    state.set_active_node(ActiveNode::Planner);
                    state.usage_mut().record_node(PLANNER);
                    self.planner.plan(state).await;
                }
                RoutingDecision::Dispatch { index, worker } => {
                    self.dispatch(state, index, &worker).await;
                }
            }
            self.checkpoint(state).await;
        }
    }

    async fn dispatch(&self, state: &mut WorkflowState, index: usize, worker: &WorkerName) {
        let Some(registered) = self.registry.get(worker) else {
            state.abort(
                WorkflowFailure::UnknownWorker {
                    name: worker.as_str().to_owned(),
                },
                None,
            );
            return;
        };
        let Some(task) = state.task_list().and_then(|list| list.get(index)) else {
            return;
        };
        let history: Vec<ConversationEntry> = state
            .recent_history(self.config.history_window)
            .to_vec();
        let assignment = WorkerAssignment::new(
            state.session_id().clone(),
            task.id(),
            worker.clone(),
            task.description(),
            state.request(),
        )
        .with_history(history);

        state.usage_mut().record_node(worker.as_str());
        let executor = registered.worker();
        let mut execution = tokio::spawn(async move { executor.execute(&assignment).await });
        let finished = tokio::time::timeout(self.config.worker_timeout, &mut execution).await;

        let outcome = match finished {
            Ok(Ok(Ok(report))) => {
                record_report(state, &report);
                report.outcome().clone()
            }
            Ok(Ok(Err(err))) => WorkerOutcome::Failed(err.to_string()),
            Ok(Err(join_error)) => {
                warn!(
                    session_id = %state.session_id(),
                    worker = %worker,
                    error = %join_error,
                    "worker did not return"
                );
                let detail = if join_error.is_panic() {
                    PANIC_ERROR
                } else {
                    CANCELLED_ERROR
                };
                WorkerOutcome::Failed(detail.to_owned())
            }
            Err(_) => {
                execution.abort();
                warn!(
                    session_id = %state.session_id(),
                    worker = %worker,
                    timeout = ?self.config.worker_timeout,
                    "worker timed out"
                );
                WorkerOutcome::Failed(TIMEOUT_ERROR.to_owned())
            }
        };
        apply_outcome(state, index, worker, outcome);
        state.set_active_node(ActiveNode::Supervisor);
    }

    async fn load_history(&self, session_id: &SessionId) -> Vec<ConversationEntry> {
        match self.store.load(session_id).await {
            Ok(Some(previous)) => previous.conversation_history().to_vec(),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "checkpoint load failed");
                Vec::new()
            }
        }
    }

    async fn checkpoint(&self, state: &mut WorkflowState) {
        state.touch(self.clock.as_ref());
        if let Err(err) = self.store.save(state).await {
            warn!(session_id = %state.session_id(), error = %err, "checkpoint save failed");
        }
    }
}

fn record_report(state: &mut WorkflowState, report: &WorkerReport) {
    let usage = state.usage_mut();
    for tool in report.tool_calls() {
        usage.record_tool(tool);
    }
    usage.add_tokens(report.tokens());
}

fn apply_outcome(state: &mut WorkflowState, index: usize, worker: &WorkerName, outcome: WorkerOutcome) {
    let (applied, message) = match outcome {
        WorkerOutcome::Completed(result) => {
            let message = result.clone();
            let applied = state
                .task_list_mut()
                .map(|list| list.complete(index, result));
            (applied, message)
        }
        WorkerOutcome::Failed(error) => {
            let message = format!("Error: {error}");
            let applied = state.task_list_mut().map(|list| list.fail(index, error));
            (applied, message)
        }
    };
    if let Some(Err(err)) = applied {
        warn!(session_id = %state.session_id(), error = %err, "task outcome rejected");
    }
    state.push_message(worker.as_str(), message);
}
