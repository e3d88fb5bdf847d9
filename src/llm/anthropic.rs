//! Anthropic Claude provider implementation (streaming Messages API)

use super::types::{
    ContentBlock, LlmMessage, LlmRequest, LlmStream, MessageRole, StreamEvent, Usage,
};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Anthropic service implementation
pub struct AnthropicService {
    client: Client,
    api_key: String,
    api_name: &'static str,
    base_url: String,
    model_id: String,
}

impl AnthropicService {
    pub fn new(
        api_key: String,
        model_id: &str,
        api_name: &'static str,
        gateway: Option<&str>,
    ) -> Result<Self, LlmError> {
        let base_url = match gateway {
            Some(gw) => format!("{}/_/gateway/anthropic/v1/messages", gw.trim_end_matches('/')),
            None => "https://api.anthropic.com/v1/messages".to_string(),
        };

        // No overall timeout: the body is a long-lived event stream and the
        // request deadline is enforced by the caller.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_name,
            base_url,
            model_id: model_id.to_string(),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> AnthropicRequest {
        let system: Vec<AnthropicSystemBlock> = request
            .system
            .iter()
            .map(|s| AnthropicSystemBlock {
                r#type: "text".to_string(),
                text: s.text.clone(),
                cache_control: s.cache.then(|| CacheControl {
                    r#type: "ephemeral".to_string(),
                }),
            })
            .collect();

        let messages: Vec<AnthropicMessage> =
            request.messages.iter().map(translate_message).collect();

        let tools: Vec<AnthropicTool> = request
            .tools
            .iter()
            .map(|t| AnthropicTool {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.input_schema.clone(),
            })
            .collect();

        AnthropicRequest {
            model: self.api_name.to_string(),
            max_tokens: request.max_tokens.unwrap_or(4096),
            system,
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            stream: true,
        }
    }
}

fn translate_message(msg: &LlmMessage) -> AnthropicMessage {
    let role = match msg.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };

    let content = msg
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::Text { text } => AnthropicContentBlock::Text { text: text.clone() },
            ContentBlock::ToolUse { id, name, input } => AnthropicContentBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            },
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => AnthropicContentBlock::ToolResult {
                tool_use_id: tool_use_id.clone(),
                content: content.clone(),
                is_error: *is_error,
            },
        })
        .collect();

    AnthropicMessage {
        role: role.to_string(),
        content,
    }
}

fn classify_error(status: reqwest::StatusCode, body: &str) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::auth(format!("Authentication failed: {body}")),
        429 => LlmError::rate_limit(format!("Rate limited: {body}")),
        400 => LlmError::invalid_request(format!("Invalid request: {body}")),
        500..=599 => LlmError::server_error(format!("Server error: {body}")),
        _ => LlmError::unknown(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl LlmService for AnthropicService {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError> {
        let anthropic_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let mut decoder = SseDecoder::default();
        let mut parser = StreamParser::default();
        let events = response.bytes_stream().flat_map(move |chunk| {
            let items: Vec<Result<StreamEvent, LlmError>> = match chunk {
                Ok(bytes) => decoder
                    .push(&bytes)
                    .into_iter()
                    .flat_map(|frame| match parser.handle(&frame) {
                        Ok(events) => events.into_iter().map(Ok).collect::<Vec<_>>(),
                        Err(e) => vec![Err(e)],
                    })
                    .collect(),
                Err(e) => vec![Err(LlmError::network(format!("Stream interrupted: {e}")))],
            };
            futures::stream::iter(items)
        });

        Ok(events.boxed())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Server-sent event decoding
// ============================================================================

/// One `event:`/`data:` frame from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
struct SseFrame {
    event: Option<String>,
    data: String,
}

/// Splits a byte stream into SSE frames, buffering partial lines across chunks.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(bytes);
        let mut frames = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    frames.push(SseFrame {
                        event: self.event.take(),
                        data: std::mem::take(&mut self.data).join("\n"),
                    });
                }
                self.event = None;
            } else if let Some(value) = line.strip_prefix("event:") {
                self.event = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data.push(value.trim_start().to_string());
            }
            // Comments (":") and unknown fields are ignored
        }
        frames
    }
}

// ============================================================================
// Anthropic stream protocol
// ============================================================================

/// Block being assembled from deltas
#[derive(Debug)]
enum PendingBlock {
    Text,
    ToolUse {
        id: String,
        name: String,
        partial_json: String,
    },
}

#[derive(Debug, Default)]
struct StreamParser {
    blocks: HashMap<u64, PendingBlock>,
    usage: Usage,
    stop_reason: Option<String>,
}

impl StreamParser {
    fn handle(&mut self, frame: &SseFrame) -> Result<Vec<StreamEvent>, LlmError> {
        let payload: StreamPayload = serde_json::from_str(&frame.data)
            .map_err(|e| LlmError::stream(format!("Unparseable stream event: {e}")))?;

        match payload {
            StreamPayload::MessageStart { message } => {
                self.usage.input_tokens = message.usage.input_tokens;
                self.usage.cache_creation_tokens =
                    message.usage.cache_creation_input_tokens.unwrap_or(0);
                self.usage.cache_read_tokens = message.usage.cache_read_input_tokens.unwrap_or(0);
                self.usage.output_tokens = message.usage.output_tokens;
                Ok(vec![])
            }
            StreamPayload::ContentBlockStart {
                index,
                content_block,
            } => {
                let (block, initial) = match content_block {
                    StartBlock::Text { text } => (PendingBlock::Text, text),
                    StartBlock::ToolUse { id, name } => (
                        PendingBlock::ToolUse {
                            id,
                            name,
                            partial_json: String::new(),
                        },
                        String::new(),
                    ),
                    StartBlock::Other => return Ok(vec![]),
                };
                self.blocks.insert(index, block);
                Ok(if initial.is_empty() {
                    vec![]
                } else {
                    vec![StreamEvent::TextDelta(initial)]
                })
            }
            StreamPayload::ContentBlockDelta { index, delta } => match delta {
                BlockDelta::TextDelta { text } => Ok(vec![StreamEvent::TextDelta(text)]),
                BlockDelta::InputJsonDelta { partial_json } => {
                    match self.blocks.get_mut(&index) {
                        Some(PendingBlock::ToolUse { partial_json: acc, .. }) => {
                            acc.push_str(&partial_json);
                            Ok(vec![])
                        }
                        _ => Err(LlmError::stream(format!(
                            "Input delta for unknown block {index}"
                        ))),
                    }
                }
                BlockDelta::Other => Ok(vec![]),
            },
            StreamPayload::ContentBlockStop { index } => match self.blocks.remove(&index) {
                Some(PendingBlock::ToolUse {
                    id,
                    name,
                    partial_json,
                }) => {
                    let input = if partial_json.trim().is_empty() {
                        Value::Object(serde_json::Map::new())
                    } else {
                        serde_json::from_str(&partial_json).map_err(|e| {
                            LlmError::stream(format!("Invalid tool input for {name}: {e}"))
                        })?
                    };
                    Ok(vec![StreamEvent::ToolUse { id, name, input }])
                }
                Some(PendingBlock::Text) | None => Ok(vec![]),
            },
            StreamPayload::MessageDelta { delta, usage } => {
                if let Some(reason) = delta.stop_reason {
                    self.stop_reason = Some(reason);
                }
                if let Some(usage) = usage {
                    self.usage.output_tokens = usage.output_tokens;
                }
                Ok(vec![])
            }
            StreamPayload::MessageStop => Ok(vec![StreamEvent::Finish {
                stop_reason: self.stop_reason.take(),
                usage: self.usage,
            }]),
            StreamPayload::Ping => Ok(vec![]),
            StreamPayload::Error { error } => Err(match error.r#type.as_str() {
                "overloaded_error" | "api_error" => LlmError::server_error(error.message),
                "rate_limit_error" => LlmError::rate_limit(error.message),
                _ => LlmError::stream(error.message),
            }),
        }
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: Vec<AnthropicSystemBlock>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicSystemBlock {
    r#type: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<CacheControl>,
}

#[derive(Debug, Serialize)]
struct CacheControl {
    r#type: String,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamPayload {
    MessageStart {
        message: StartMessage,
    },
    ContentBlockStart {
        index: u64,
        content_block: StartBlock,
    },
    ContentBlockDelta {
        index: u64,
        delta: BlockDelta,
    },
    ContentBlockStop {
        index: u64,
    },
    MessageDelta {
        delta: MessageDeltaBody,
        #[serde(default)]
        usage: Option<DeltaUsage>,
    },
    MessageStop,
    Ping,
    Error {
        error: StreamError,
    },
}

#[derive(Debug, Deserialize)]
struct StartMessage {
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StartBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockDelta {
    TextDelta {
        text: String,
    },
    InputJsonDelta {
        partial_json: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessageDeltaBody {
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeltaUsage {
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    r#type: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frames(raw: &str) -> Vec<SseFrame> {
        SseDecoder::default().push(raw.as_bytes())
    }

    fn run(raw: &str) -> Vec<StreamEvent> {
        let mut parser = StreamParser::default();
        frames(raw)
            .iter()
            .flat_map(|f| parser.handle(f).unwrap())
            .collect()
    }

    #[test]
    fn test_decoder_handles_split_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"event: ping\nda").is_empty());
        let out = decoder.push(b"ta: {\"type\":\"ping\"}\r\n\r\n");
        assert_eq!(
            out,
            vec![SseFrame {
                event: Some("ping".to_string()),
                data: "{\"type\":\"ping\"}".to_string(),
            }]
        );
    }

    #[test]
    fn test_text_and_tool_use_stream() {
        let raw = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{\"usage\":{\"input_tokens\":12,\"output_tokens\":1}}}\n\n",
            "event: content_block_start\n",
            "data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Checking \"}}\n\n",
            "event: content_block_stop\n",
            "data: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
            "event: content_block_start\n",
            "data: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_1\",\"name\":\"getEvent\",\"input\":{}}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"eventId\\\":\"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\" \\\"abc\\\"}\"}}\n\n",
            "event: content_block_stop\n",
            "data: {\"type\":\"content_block_stop\",\"index\":1}\n\n",
            "event: message_delta\n",
            "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"tool_use\"},\"usage\":{\"output_tokens\":40}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );

        let events = run(raw);
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("Checking ".to_string()),
                StreamEvent::ToolUse {
                    id: "toolu_1".to_string(),
                    name: "getEvent".to_string(),
                    input: json!({"eventId": "abc"}),
                },
                StreamEvent::Finish {
                    stop_reason: Some("tool_use".to_string()),
                    usage: Usage {
                        input_tokens: 12,
                        output_tokens: 40,
                        ..Usage::default()
                    },
                },
            ]
        );
    }

    #[test]
    fn test_tool_use_without_arguments_gets_empty_object() {
        let raw = concat!(
            "data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"tool_use\",\"id\":\"t\",\"name\":\"getNextUpcomingEvent\",\"input\":{}}}\n\n",
            "data: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
        );
        assert_eq!(
            run(raw),
            vec![StreamEvent::ToolUse {
                id: "t".to_string(),
                name: "getNextUpcomingEvent".to_string(),
                input: json!({}),
            }]
        );
    }

    #[test]
    fn test_error_event_is_classified() {
        let mut parser = StreamParser::default();
        let frame = SseFrame {
            event: Some("error".to_string()),
            data: json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })
            .to_string(),
        };
        let err = parser.handle(&frame).unwrap_err();
        assert_eq!(err.kind, crate::llm::LlmErrorKind::ServerError);
    }

    #[test]
    fn test_classify_http_status() {
        let err = classify_error(reqwest::StatusCode::UNAUTHORIZED, "nope");
        assert_eq!(err.kind, crate::llm::LlmErrorKind::Auth);
        let err = classify_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.kind.is_retryable());
    }
}
