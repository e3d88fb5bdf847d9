//! Conversation orchestrator
//!
//! Runs one chat request: streams model turns, dispatches the tool calls they
//! ask for, feeds results back, and frames everything the client sees as a
//! sequence of [`ChatEvent`]s. Control flow lives in the pure state machine;
//! this module only executes its effects.

mod chunker;
mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use chunker::WordChunker;
pub use executor::{Orchestrator, OrchestratorConfig};
pub use traits::*;

/// Orchestrator over any model client and the calendar tools
pub type ChatOrchestrator = Orchestrator<std::sync::Arc<dyn LlmClient>, crate::tools::ToolRegistry>;

use crate::llm::LlmError;
use crate::state_machine::TransitionError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// The only failure text a client ever sees
pub const PUBLIC_ERROR_MESSAGE: &str = "An error occurred processing your request.";

/// Events streamed to the client for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A new assistant message begins
    MessageStart { message_id: String },

    /// A whole-word chunk of assistant text
    Text { message_id: String, delta: String },

    /// The model asked for a tool
    ToolCall {
        message_id: String,
        tool_call_id: String,
        name: String,
        arguments: Value,
    },

    /// A tool finished (successfully or with a structured error)
    ToolResult {
        tool_call_id: String,
        name: String,
        success: bool,
        result: Value,
    },

    /// The request ended cleanly
    Finish { reason: &'static str },

    /// The request failed; never carries internal detail
    Error { message: String },
}

impl ChatEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            ChatEvent::MessageStart { .. } => "message_start",
            ChatEvent::Text { .. } => "text",
            ChatEvent::ToolCall { .. } => "tool_call",
            ChatEvent::ToolResult { .. } => "tool_result",
            ChatEvent::Finish { .. } => "finish",
            ChatEvent::Error { .. } => "error",
        }
    }

    pub fn public_error() -> Self {
        ChatEvent::Error {
            message: PUBLIC_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Model stream failed: {0}")]
    Llm(#[from] LlmError),
    #[error("State machine rejected event: {0}")]
    Transition(#[from] TransitionError),
    #[error("Request exceeded {0:?}")]
    Timeout(Duration),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Client disconnected")]
    ClientGone,
}
