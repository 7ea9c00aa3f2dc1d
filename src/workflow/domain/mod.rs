//! Domain model for workflow runs.

mod failure;
mod reply;
mod session;
mod state;
mod usage;

pub use failure::WorkflowFailure;
pub use reply::{
    APOLOGY, NO_TASKS, PlanReply, PlannedTask, RouteReply, TECHNICAL_DIFFICULTIES, extract_json,
    is_refusal, parse_reply, preview,
};
pub use session::SessionId;
pub use state::{
    ActiveNode, ConversationEntry, RoutingPhase, WorkflowMessage, WorkflowState,
};
pub use usage::{TokenUsage, UsageStats};
