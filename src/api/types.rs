//! API request and response types

use crate::llm::{ContentBlock, LlmMessage, MessageRole, ModelInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ConversationMessage>,
}

/// One role-tagged message of the client's transcript
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub role: Role,
    /// Plain text shorthand for a single text part
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolCall {
        tool_call_id: String,
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    #[serde(rename_all = "camelCase")]
    ToolResult {
        tool_call_id: String,
        result: Value,
        #[serde(default)]
        is_error: bool,
    },
}

impl ConversationMessage {
    fn into_blocks(self) -> Result<Vec<ContentBlock>, String> {
        let mut blocks = Vec::with_capacity(self.parts.len() + 1);
        if let Some(text) = self.content.filter(|t| !t.is_empty()) {
            blocks.push(ContentBlock::text(text));
        }

        for part in self.parts {
            let allowed = matches!(
                (self.role, &part),
                (_, MessagePart::Text { .. })
                    | (Role::Assistant, MessagePart::ToolCall { .. })
                    | (Role::Tool, MessagePart::ToolResult { .. })
            );
            if !allowed {
                return Err(format!("{:?} message cannot contain {}", self.role, part.kind()));
            }

            blocks.push(match part {
                MessagePart::Text { text } => ContentBlock::text(text),
                MessagePart::ToolCall {
                    tool_call_id,
                    name,
                    arguments,
                } => ContentBlock::tool_use(tool_call_id, name, arguments),
                MessagePart::ToolResult {
                    tool_call_id,
                    result,
                    is_error,
                } => {
                    let content = match result {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    ContentBlock::tool_result(tool_call_id, content, is_error)
                }
            });
        }
        Ok(blocks)
    }
}

impl MessagePart {
    fn kind(&self) -> &'static str {
        match self {
            MessagePart::Text { .. } => "text",
            MessagePart::ToolCall { .. } => "tool_call",
            MessagePart::ToolResult { .. } => "tool_result",
        }
    }
}

/// Convert the client transcript into model history.
///
/// Tool-role messages travel as user-role tool results, and consecutive
/// messages with the same model role are merged so roles alternate.
pub fn to_llm_history(messages: Vec<ConversationMessage>) -> Result<Vec<LlmMessage>, String> {
    let mut history: Vec<LlmMessage> = Vec::with_capacity(messages.len());

    for message in messages {
        let role = match message.role {
            Role::User | Role::Tool => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        };
        let blocks = message.into_blocks()?;
        if blocks.is_empty() {
            continue;
        }

        match history.last_mut() {
            Some(last) if last.role == role => last.content.extend(blocks),
            _ => history.push(LlmMessage {
                role,
                content: blocks,
            }),
        }
    }

    match history.last() {
        None => Err("messages must contain at least one non-empty message".to_string()),
        Some(last) if last.role == MessageRole::Assistant => {
            Err("last message must come from the user".to_string())
        }
        Some(_) => Ok(history),
    }
}

/// Response listing available models
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
