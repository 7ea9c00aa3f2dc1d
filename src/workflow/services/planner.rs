//! Turns a request into an ordered task list.

use crate::task::domain::{Task, TaskList};
use crate::workflow::{
    WorkflowConfig,
    domain::{APOLOGY, ActiveNode, PlanReply, WorkflowFailure, WorkflowState, is_refusal, parse_reply},
    ports::{OraclePrompt, PlanningOracle},
    services::{PromptRenderer, RoutingError, WorkerRegistry},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Node name under which planner invocations are counted.
pub const PLANNER: &str = "planner";

/// Asks the oracle for a plan and validates it against the registry.
///
/// A reply that cannot be parsed counts as a failed attempt; the supervisor
/// decides whether to retry.
pub struct Planner<O>
where
    O: PlanningOracle,
{
    oracle: Arc<O>,
    registry: Arc<WorkerRegistry>,
    prompts: PromptRenderer,
    history_window: usize,
}

impl<O> Planner<O>
where
    O: PlanningOracle,
{
    /// Creates a planner.
    #[must_use]
    pub fn new(oracle: Arc<O>, registry: Arc<WorkerRegistry>, config: &WorkflowConfig) -> Self {
        Self {
            oracle,
            registry,
            prompts: PromptRenderer::new(),
            history_window: config.history_window,
        }
    }

    /// Produces a plan, a terminal outcome, or a failed attempt on `state`.
    pub async fn plan(&self, state: &mut WorkflowState) {
        match self.consult_oracle(state).await {
            Ok(reply) => self.apply(state, &reply),
            Err(err) => {
                warn!(session_id = %state.session_id(), error = %err, "planning oracle failed");
                state.record_planner_failure(err.to_string());
                state.set_active_node(ActiveNode::Supervisor);
            }
        }
    }

    async fn consult_oracle(&self, state: &WorkflowState) -> Result<String, RoutingError> {
        let rendered = self.prompts.plan(
            &self.registry,
            state.recent_history(self.history_window),
            state.request(),
            state.last_planner_error(),
        )?;
        let prompt = OraclePrompt::new(state.session_id().clone(), state.request(), rendered);
        Ok(self.oracle.propose_plan(&prompt).await?)
    }

    fn apply(&self, state: &mut WorkflowState, reply: &str) {
        let plan = match parse_reply::<PlanReply>(reply) {
            Ok(plan) => plan,
            Err(err) => {
                if is_refusal(reply) {
                    info!(session_id = %state.session_id(), "planning oracle refused the request");
                    state.push_message(PLANNER, reply);
                    state.finish(APOLOGY);
                    return;
                }
                warn!(
                    session_id = %state.session_id(),
                    attempt = state.planner_attempts().saturating_add(1),
                    error = %err,
                    "plan reply unusable"
                );
                state.record_planner_failure(err);
                state.set_active_node(ActiveNode::Supervisor);
                return;
            }
        };

        let mut tasks = Vec::with_capacity(plan.tasks.len());
        for planned in plan.tasks {
            let Some(worker) = self.registry.resolve(&planned.worker) else {
                warn!(
                    session_id = %state.session_id(),
                    worker = %planned.worker,
                    "plan names an unregistered worker"
                );
                state.abort(
                    WorkflowFailure::UnknownWorker {
                        name: planned.worker,
                    },
                    None,
                );
                return;
            };
            tasks.push(Task::new(worker, planned.description));
        }

        info!(
            session_id = %state.session_id(),
            tasks = tasks.len(),
            reasoning = %plan.reasoning,
            "plan created"
        );
        state.push_message(
            PLANNER,
            format!(
                "Created task plan with {} tasks. Reasoning: {}",
                tasks.len(),
                plan.reasoning
            ),
        );
        state.set_task_list(TaskList::new(tasks, plan.reasoning));
        state.set_active_node(ActiveNode::Supervisor);
    }
}
