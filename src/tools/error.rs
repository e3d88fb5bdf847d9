//! Tool failure taxonomy

use crate::calendar::StoreError;
use crate::time::TimeError;
use thiserror::Error;

/// Why a tool call did not produce a result.
///
/// All variants are recoverable: the model sees the message and can retry
/// with corrected arguments or explain the problem to the user.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid time input: {0}")]
    InvalidTimeInput(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Event not found: {0}")]
    NotFound(String),
    #[error("Calendar unavailable: {0}")]
    Upstream(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool {0} failed unexpectedly")]
    Internal(String),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation(message.into())
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, ToolError::Upstream(_) | ToolError::Internal(_))
    }
}

impl From<TimeError> for ToolError {
    fn from(e: TimeError) -> Self {
        match e {
            TimeError::InvalidTimeInput(message) => ToolError::InvalidTimeInput(message),
        }
    }
}

impl From<StoreError> for ToolError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ToolError::NotFound(id),
            StoreError::Backend(message) => ToolError::Upstream(message),
        }
    }
}
