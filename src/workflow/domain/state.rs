//! Mutable state carried through one workflow run.

use super::{SessionId, UsageStats, WorkflowFailure};
use crate::task::domain::{TaskList, WorkerName};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node the run will visit next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", content = "worker", rename_all = "snake_case")]
pub enum ActiveNode {
    /// Routing decision pending.
    Supervisor,
    /// A plan is being produced.
    Planner,
    /// A task is executing on the named worker.
    Worker(WorkerName),
    /// The run is over.
    Terminal,
}

impl fmt::Display for ActiveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supervisor => f.write_str("supervisor"),
            Self::Planner => f.write_str("planner"),
            Self::Worker(name) => write!(f, "{name}"),
            Self::Terminal => f.write_str("__end__"),
        }
    }
}

/// Coarse view of a run used by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingPhase {
    /// No plan exists yet.
    NoPlan,
    /// The plan has no tasks.
    PlanEmpty,
    /// At least one task is pending or in progress.
    PlanActive,
    /// Every task is completed or failed.
    PlanDone,
    /// A final result or failure has been recorded.
    Terminal,
}

/// Trace line appended by the supervisor, the planner and workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowMessage {
    role: String,
    content: String,
}

impl WorkflowMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Producing node.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Message body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// One completed exchange in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    request: String,
    result: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl ConversationEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(
        request: impl Into<String>,
        result: Option<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            request: request.into(),
            result,
            recorded_at,
        }
    }

    /// The request text.
    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    /// The final result, when the run produced one.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// When the exchange finished.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// State of one request as it moves through the workflow.
///
/// Serializes losslessly to JSON so it can be checkpointed under the
/// session key and resumed for the next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    session_id: SessionId,
    request: String,
    task_list: Option<TaskList>,
    active_node: ActiveNode,
    usage: UsageStats,
    messages: Vec<WorkflowMessage>,
    conversation_history: Vec<ConversationEntry>,
    failure: Option<WorkflowFailure>,
    final_result: Option<String>,
    planner_attempts: u32,
    last_planner_error: Option<String>,
    iterations: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkflowState {
    /// Creates the state for a fresh request.
    #[must_use]
    pub fn new(session_id: SessionId, request: impl Into<String>, clock: &impl Clock) -> Self {
        let now = clock.utc();
        Self {
            session_id,
            request: request.into(),
            task_list: None,
            active_node: ActiveNode::Supervisor,
            usage: UsageStats::new(),
            messages: Vec::new(),
            conversation_history: Vec::new(),
            failure: None,
            final_result: None,
            planner_attempts: 0,
            last_planner_error: None,
            iterations: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Carries over conversation history from an earlier run.
    #[must_use]
    pub fn with_history(mut self, history: Vec<ConversationEntry>) -> Self {
        self.conversation_history = history;
        self
    }

    /// Session key.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Original request text.
    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Current plan, if any.
    #[must_use]
    pub const fn task_list(&self) -> Option<&TaskList> {
        self.task_list.as_ref()
    }

    /// Mutable access to the current plan.
    pub const fn task_list_mut(&mut self) -> Option<&mut TaskList> {
        self.task_list.as_mut()
    }

    /// Installs a plan.
    pub fn set_task_list(&mut self, task_list: TaskList) {
        self.task_list = Some(task_list);
    }

    /// Node to visit next.
    #[must_use]
    pub const fn active_node(&self) -> &ActiveNode {
        &self.active_node
    }

    /// Moves the run to `node`.
    pub fn set_active_node(&mut self, node: ActiveNode) {
        self.active_node = node;
    }

    /// Usage counters.
    #[must_use]
    pub const fn usage(&self) -> &UsageStats {
        &self.usage
    }

    /// Mutable usage counters.
    pub const fn usage_mut(&mut self) -> &mut UsageStats {
        &mut self.usage
    }

    /// In-run trace.
    #[must_use]
    pub fn messages(&self) -> &[WorkflowMessage] {
        &self.messages
    }

    /// Appends a trace line.
    pub fn push_message(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.messages.push(WorkflowMessage::new(role, content));
    }

    /// Earlier exchanges of this session, oldest first.
    #[must_use]
    pub fn conversation_history(&self) -> &[ConversationEntry] {
        &self.conversation_history
    }

    /// The last `window` exchanges, oldest first.
    #[must_use]
    pub fn recent_history(&self, window: usize) -> &[ConversationEntry] {
        let start = self.conversation_history.len().saturating_sub(window);
        self.conversation_history.get(start..).unwrap_or_default()
    }

    /// Appends this run's exchange to the history.
    pub fn record_conversation(&mut self, clock: &impl Clock) {
        let entry = ConversationEntry::new(
            self.request.clone(),
            self.final_result.clone(),
            clock.utc(),
        );
        self.conversation_history.push(entry);
    }

    /// Recorded failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&WorkflowFailure> {
        self.failure.as_ref()
    }

    /// Final result, if any.
    #[must_use]
    pub fn final_result(&self) -> Option<&str> {
        self.final_result.as_deref()
    }

    /// Ends the run with a result.
    pub fn finish(&mut self, result: impl Into<String>) {
        self.final_result = Some(result.into());
        self.active_node = ActiveNode::Terminal;
    }

    /// Ends the run with a failure and an optional user-facing result.
    pub fn abort(&mut self, failure: WorkflowFailure, result: Option<String>) {
        self.failure = Some(failure);
        self.final_result = result;
        self.active_node = ActiveNode::Terminal;
    }

    /// Planner attempts that failed to produce a usable plan.
    #[must_use]
    pub const fn planner_attempts(&self) -> u32 {
        self.planner_attempts
    }

    /// Parse or oracle error from the last failed planner attempt.
    #[must_use]
    pub fn last_planner_error(&self) -> Option<&str> {
        self.last_planner_error.as_deref()
    }

    /// Counts a failed planner attempt.
    pub fn record_planner_failure(&mut self, error: impl Into<String>) {
        self.planner_attempts = self.planner_attempts.saturating_add(1);
        self.last_planner_error = Some(error.into());
    }

    /// Supervisor iterations so far.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Counts one supervisor iteration and returns the new total.
    pub const fn next_iteration(&mut self) -> u32 {
        self.iterations = self.iterations.saturating_add(1);
        self.iterations
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification time.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stamps the modification time.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    /// Classifies the run for routing.
    #[must_use]
    pub fn routing_phase(&self) -> RoutingPhase {
        if self.active_node == ActiveNode::Terminal
            || self.final_result.is_some()
            || self.failure.is_some()
        {
            return RoutingPhase::Terminal;
        }
        match &self.task_list {
            None => RoutingPhase::NoPlan,
            Some(list) if list.is_empty() => RoutingPhase::PlanEmpty,
            Some(list) if list.all_settled() => RoutingPhase::PlanDone,
            Some(_) => RoutingPhase::PlanActive,
        }
    }

    /// Returns `true` once the run has ended.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.routing_phase() == RoutingPhase::Terminal
    }
}
