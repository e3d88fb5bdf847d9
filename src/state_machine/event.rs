//! Events that drive the agent loop

use crate::tools::{ToolCall, ToolOutput};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// History received; begin the first model turn
    Start,

    /// A model turn finished streaming
    TurnFinished {
        text: String,
        tool_calls: Vec<ToolCall>,
    },

    /// Every call of the pending step has produced a result
    ToolsCompleted { results: Vec<ToolResult> },

    /// Model stream or transport failure
    Failed { message: String },
}

/// Outcome of one tool call, tagged with the call it answers
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub name: String,
    pub output: ToolOutput,
}

impl ToolResult {
    pub fn new(call: &ToolCall, output: ToolOutput) -> Self {
        Self {
            tool_use_id: call.id.clone(),
            name: call.name.clone(),
            output,
        }
    }
}
