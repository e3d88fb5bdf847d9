//! Agent loop state types

use crate::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// Default number of tool steps allowed per request
pub const DEFAULT_MAX_STEPS: u32 = 25;

/// Agent loop state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentState {
    /// Nothing has happened yet
    Idle,

    /// A model turn is being streamed
    Streaming { steps_remaining: u32 },

    /// The last turn asked for tools; waiting on all of them
    ToolPending {
        calls: Vec<ToolCall>,
        steps_remaining: u32,
    },

    /// Loop is over
    Terminated(Outcome),
}

impl AgentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Terminated(_))
    }

    /// Remaining step budget, if the loop is still running
    pub fn steps_remaining(&self) -> Option<u32> {
        match self {
            AgentState::Streaming { steps_remaining }
            | AgentState::ToolPending {
                steps_remaining, ..
            } => Some(*steps_remaining),
            AgentState::Idle | AgentState::Terminated(_) => None,
        }
    }

    /// Short label for logging
    pub fn name(&self) -> &'static str {
        match self {
            AgentState::Idle => "idle",
            AgentState::Streaming { .. } => "streaming",
            AgentState::ToolPending { .. } => "tool_pending",
            AgentState::Terminated(Outcome::Success) => "success",
            AgentState::Terminated(Outcome::StepLimitExceeded) => "step_limit_exceeded",
            AgentState::Terminated(Outcome::Error { .. }) => "error",
        }
    }
}

/// How a request ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The model produced a turn without tool calls
    Success,
    /// Budget ran out before a tool-free turn; still a clean end
    StepLimitExceeded,
    /// Model or transport failure
    Error { message: String },
}

/// Immutable settings for one run of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopContext {
    pub max_steps: u32,
}

impl LoopContext {
    pub fn new(max_steps: u32) -> Self {
        Self { max_steps }
    }
}

impl Default for LoopContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEPS)
    }
}
