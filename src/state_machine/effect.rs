//! Effects produced by state transitions

use super::event::ToolResult;
use super::state::Outcome;
use crate::tools::ToolCall;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open a model stream over the current history
    RequestModel,

    /// Record the finished assistant turn in the history
    AppendAssistant {
        text: String,
        tool_calls: Vec<ToolCall>,
    },

    /// Run every call of the step concurrently, then report `ToolsCompleted`
    DispatchTools { calls: Vec<ToolCall> },

    /// Record tool results in the history, in issue order
    AppendToolResults { results: Vec<ToolResult> },

    /// Send the fixed step-limit message to the client
    EmitStepLimitMessage,

    /// Close the response
    Finish { outcome: Outcome },
}

impl Effect {
    pub fn finish(outcome: Outcome) -> Self {
        Effect::Finish { outcome }
    }
}
