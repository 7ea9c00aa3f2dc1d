//! Per-run usage accounting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Token counts reported by a worker or oracle call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    input: u64,
    output: u64,
    total: u64,
}

impl TokenUsage {
    /// Creates a usage record; the total is the sum of both sides.
    #[must_use]
    pub const fn new(input: u64, output: u64) -> Self {
        Self {
            input,
            output,
            total: input.saturating_add(output),
        }
    }

    /// Prompt tokens.
    #[must_use]
    pub const fn input(&self) -> u64 {
        self.input
    }

    /// Completion tokens.
    #[must_use]
    pub const fn output(&self) -> u64 {
        self.output
    }

    /// Combined tokens.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input = self.input.saturating_add(rhs.input);
        self.output = self.output.saturating_add(rhs.output);
        self.total = self.total.saturating_add(rhs.total);
    }
}

/// Counters accumulated while a workflow runs.
///
/// Node invocations count the supervisor, the planner and each worker under
/// their own names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    node_invocations: BTreeMap<String, u64>,
    tool_invocations: BTreeMap<String, u64>,
    tokens: TokenUsage,
}

impl UsageStats {
    /// Creates empty counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one invocation of `node`.
    pub fn record_node(&mut self, node: &str) {
        let count = self.node_invocations.entry(node.to_owned()).or_default();
        *count = count.saturating_add(1);
    }

    /// Counts one invocation of `tool`.
    pub fn record_tool(&mut self, tool: &str) {
        let count = self.tool_invocations.entry(tool.to_owned()).or_default();
        *count = count.saturating_add(1);
    }

    /// Adds reported token usage.
    pub fn add_tokens(&mut self, tokens: TokenUsage) {
        self.tokens += tokens;
    }

    /// Invocations of `node` so far.
    #[must_use]
    pub fn node_count(&self, node: &str) -> u64 {
        self.node_invocations.get(node).copied().unwrap_or_default()
    }

    /// Invocations of `tool` so far.
    #[must_use]
    pub fn tool_count(&self, tool: &str) -> u64 {
        self.tool_invocations.get(tool).copied().unwrap_or_default()
    }

    /// Per-node invocation counts.
    #[must_use]
    pub const fn node_invocations(&self) -> &BTreeMap<String, u64> {
        &self.node_invocations
    }

    /// Per-tool invocation counts.
    #[must_use]
    pub const fn tool_invocations(&self) -> &BTreeMap<String, u64> {
        &self.tool_invocations
    }

    /// Accumulated token usage.
    #[must_use]
    pub const fn tokens(&self) -> TokenUsage {
        self.tokens
    }
}
