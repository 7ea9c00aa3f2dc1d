//! Routing decisions between workflow steps.

use crate::intent::{IntentCategory, IntentClassifier};
use crate::task::domain::{Task, TaskList, WorkerName};
use crate::workflow::{
    WorkflowConfig,
    domain::{
        APOLOGY, ActiveNode, NO_TASKS, RouteReply, RoutingPhase, TECHNICAL_DIFFICULTIES,
        WorkflowFailure, WorkflowState, is_refusal, parse_reply,
    },
    ports::{OracleError, OraclePrompt, PlanningOracle},
    services::{PromptRenderer, WorkerRegistry},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Node name under which supervisor iterations are counted.
pub const SUPERVISOR: &str = "supervisor";

/// Requests with at most this many tokens go to the general worker when
/// routing falls back.
const SHORT_REQUEST_TOKENS: usize = 3;

/// What the engine does next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Ask the planner for a task list.
    Plan,
    /// Execute the task at `index` on `worker`.
    Dispatch {
        /// Position of the task in the plan.
        index: usize,
        /// Assigned worker.
        worker: WorkerName,
    },
    /// Stop; the state holds the final result or failure.
    Terminal,
}

/// Reasons the routing oracle could not be consulted.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Prompt rendering failed.
    #[error("failed to render prompt: {0}")]
    Prompt(#[from] minijinja::Error),

    /// The oracle call failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Hub of the workflow: every step returns here for the next decision.
pub struct Supervisor<O>
where
    O: PlanningOracle,
{
    oracle: Arc<O>,
    registry: Arc<WorkerRegistry>,
    classifier: Arc<IntentClassifier>,
    prompts: PromptRenderer,
    config: WorkflowConfig,
}

impl<O> Supervisor<O>
where
    O: PlanningOracle,
{
    /// Creates a supervisor.
    #[must_use]
    pub fn new(
        oracle: Arc<O>,
        registry: Arc<WorkerRegistry>,
        classifier: Arc<IntentClassifier>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            oracle,
            registry,
            classifier,
            prompts: PromptRenderer::new(),
            config,
        }
    }

    /// Decides the next step and records terminal outcomes on `state`.
    ///
    /// A dispatched task is marked in progress before returning.
    pub async fn decide(&self, state: &mut WorkflowState) -> RoutingDecision {
        match state.routing_phase() {
            RoutingPhase::Terminal => RoutingDecision::Terminal,
            RoutingPhase::NoPlan => self.route_without_plan(state).await,
            RoutingPhase::PlanEmpty => {
                info!(session_id = %state.session_id(), "plan has no tasks");
                state.finish(NO_TASKS);
                RoutingDecision::Terminal
            }
            RoutingPhase::PlanActive => self.dispatch_next(state),
            RoutingPhase::PlanDone => {
                let result = state
                    .task_list()
                    .map(TaskList::assemble_result)
                    .unwrap_or_default();
                info!(session_id = %state.session_id(), "all tasks settled");
                state.finish(result);
                RoutingDecision::Terminal
            }
        }
    }

    async fn route_without_plan(&self, state: &mut WorkflowState) -> RoutingDecision {
        if state.planner_attempts() >= self.config.max_planner_attempts {
            let detail = state
                .last_planner_error()
                .unwrap_or("planner produced no usable plan")
                .to_owned();
            warn!(
                session_id = %state.session_id(),
                attempts = state.planner_attempts(),
                detail = %detail,
                "planner attempts exhausted"
            );
            state.abort(
                WorkflowFailure::RoutingParseFailure { detail },
                Some(TECHNICAL_DIFFICULTIES.to_owned()),
            );
            return RoutingDecision::Terminal;
        }
        if state.planner_attempts() > 0 {
            return RoutingDecision::Plan;
        }

        match self.consult_oracle(state).await {
            Ok(reply) => self.interpret_route(state, &reply),
            Err(err) => {
                warn!(session_id = %state.session_id(), error = %err, "routing oracle failed");
                self.fall_back(state, &err.to_string())
            }
        }
    }

    async fn consult_oracle(&self, state: &WorkflowState) -> Result<String, RoutingError> {
        let rendered = self.prompts.route(
            &self.registry,
            state.recent_history(self.config.history_window),
            state.request(),
        )?;
        let prompt = OraclePrompt::new(state.session_id().clone(), state.request(), rendered);
        Ok(self.oracle.propose_route(&prompt).await?)
    }

    fn interpret_route(&self, state: &mut WorkflowState, reply: &str) -> RoutingDecision {
        let parse_error = match parse_reply::<RouteReply>(reply) {
            Ok(route) => return self.apply_route(state, &route),
            Err(err) => err,
        };
        if is_refusal(reply) {
            info!(session_id = %state.session_id(), "routing oracle refused the request");
            state.push_message(SUPERVISOR, reply);
            state.finish(APOLOGY);
            return RoutingDecision::Terminal;
        }
        if let Some(worker) = self.registry.mentioned_in(reply) {
            return self.direct(state, worker, "worker named in unstructured routing reply");
        }
        warn!(
            session_id = %state.session_id(),
            error = %parse_error,
            "routing reply unusable; falling back"
        );
        self.fall_back(state, &parse_error)
    }

    fn apply_route(&self, state: &mut WorkflowState, route: &RouteReply) -> RoutingDecision {
        info!(
            session_id = %state.session_id(),
            next = %route.next_worker,
            reasoning = %route.reasoning,
            "routing decision"
        );
        if route.is_planner() {
            return RoutingDecision::Plan;
        }
        if route.is_end() {
            state.set_task_list(TaskList::new(Vec::new(), route.reasoning.clone()));
            state.finish(NO_TASKS);
            return RoutingDecision::Terminal;
        }
        match self.registry.resolve(&route.next_worker) {
            Some(worker) => self.direct(state, worker, &route.reasoning),
            None => {
                warn!(
                    session_id = %state.session_id(),
                    worker = %route.next_worker,
                    "routing named an unregistered worker"
                );
                state.abort(
                    WorkflowFailure::UnknownWorker {
                        name: route.next_worker.clone(),
                    },
                    None,
                );
                RoutingDecision::Terminal
            }
        }
    }

    fn fall_back(&self, state: &mut WorkflowState, detail: &str) -> RoutingDecision {
        let intent = self.classifier.classify(state.request());
        let is_short = state.request().split_whitespace().count() <= SHORT_REQUEST_TOKENS;
        if intent.category() != IntentCategory::Conversational && !is_short {
            return RoutingDecision::Plan;
        }
        match self.registry.resolve(&self.config.general_worker) {
            Some(worker) => self.direct(state, worker, "fallback to the general worker"),
            None => {
                warn!(
                    session_id = %state.session_id(),
                    general_worker = %self.config.general_worker,
                    "fallback worker is not registered"
                );
                state.abort(
                    WorkflowFailure::RoutingParseFailure {
                        detail: format!(
                            "{detail}; fallback worker '{}' is not registered",
                            self.config.general_worker
                        ),
                    },
                    Some(TECHNICAL_DIFFICULTIES.to_owned()),
                );
                RoutingDecision::Terminal
            }
        }
    }

    fn direct(&self, state: &mut WorkflowState, worker: WorkerName, reasoning: &str) -> RoutingDecision {
        let task = Task::new(worker, state.request());
        state.set_task_list(TaskList::new(vec![task], reasoning));
        self.dispatch_next(state)
    }

    fn dispatch_next(&self, state: &mut WorkflowState) -> RoutingDecision {
        let Some(list) = state.task_list_mut() else {
            return RoutingDecision::Plan;
        };
        let Some(index) = list.next_open() else {
            return RoutingDecision::Terminal;
        };
        let Some(worker) = list.get(index).map(|task| task.worker().clone()) else {
            return RoutingDecision::Terminal;
        };
        if list.active() != Some(index)
            && let Err(err) = list.start(index)
        {
            warn!(error = %err, "could not start task");
            state.abort(
                WorkflowFailure::RoutingParseFailure {
                    detail: err.to_string(),
                },
                Some(TECHNICAL_DIFFICULTIES.to_owned()),
            );
            return RoutingDecision::Terminal;
        }

        if let Some(progress) = state.task_list().and_then(|list| self.prompts.progress(list).ok()) {
            state.push_message(SUPERVISOR, progress);
        }
        info!(
            session_id = %state.session_id(),
            worker = %worker,
            task = index,
            "dispatching task"
        );
        state.set_active_node(ActiveNode::Worker(worker.clone()));
        RoutingDecision::Dispatch { index, worker }
    }
}
