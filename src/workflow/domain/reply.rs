//! Parsing of free-form oracle replies.

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Result text used when the oracle refuses a request.
pub const APOLOGY: &str = "I apologize, but I'm unable to assist with that request.";

/// Result text used when routing cannot recover.
pub const TECHNICAL_DIFFICULTIES: &str =
    "I'm experiencing technical difficulties. Please try rephrasing your request.";

/// Result text used when the plan has nothing to do.
pub const NO_TASKS: &str = "No tasks required for this request.";

const REFUSAL_PHRASES: [&str; 8] = [
    "can't help",
    "cannot help",
    "unable to assist",
    "can't assist",
    "cannot assist",
    "decline",
    "won't be able to",
    "not able to help",
];

/// Structured routing decision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteReply {
    /// Worker, `planner`, or an end marker.
    #[serde(alias = "next_agent")]
    pub next_worker: String,
    /// Free-text justification.
    #[serde(default)]
    pub reasoning: String,
}

impl RouteReply {
    /// Returns `true` when the decision ends the run without tasks.
    #[must_use]
    pub fn is_end(&self) -> bool {
        let target = self.next_worker.trim();
        target.eq_ignore_ascii_case("__end__") || target.eq_ignore_ascii_case("end")
    }

    /// Returns `true` when the decision asks for a plan.
    #[must_use]
    pub fn is_planner(&self) -> bool {
        self.next_worker.trim().eq_ignore_ascii_case("planner")
    }
}

/// One planned task as the oracle describes it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlannedTask {
    /// Worker name, not yet validated.
    #[serde(alias = "agent")]
    pub worker: String,
    /// Task description.
    pub description: String,
}

/// Structured plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanReply {
    /// Tasks in execution order.
    pub tasks: Vec<PlannedTask>,
    /// Free-text justification.
    #[serde(default)]
    pub reasoning: String,
}

/// Locates the JSON object inside a reply.
///
/// A fenced code block wins; otherwise the span from the first `{` to the
/// last `}` is used.
#[must_use]
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some((_, after_fence)) = text.split_once("```") {
        let body = after_fence
            .strip_prefix("json")
            .or_else(|| after_fence.strip_prefix("JSON"))
            .unwrap_or(after_fence);
        if let Some((block, _)) = body.split_once("```") {
            let trimmed = block.trim();
            if trimmed.starts_with('{') {
                return Some(trimmed);
            }
        }
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Parses the JSON object inside `text` as `T`.
///
/// # Errors
///
/// Returns a description of why no usable object was found.
pub fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let json = extract_json(text).ok_or_else(|| "reply contains no JSON object".to_owned())?;
    serde_json::from_str(json).map_err(|err| err.to_string())
}

/// Returns `true` when the reply reads as a refusal.
///
/// Curly apostrophes are folded to straight ones before matching.
#[must_use]
pub fn is_refusal(text: &str) -> bool {
    let normalized = text.replace('\u{2019}', "'").to_lowercase();
    REFUSAL_PHRASES
        .iter()
        .any(|phrase| normalized.contains(phrase))
}

/// Truncates `text` to at most `limit` characters, marking the cut.
#[must_use]
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", text.get(..cut).unwrap_or(text)),
        None => text.to_owned(),
    }
}
