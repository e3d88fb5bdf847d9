//! Calendar tools exposed to the model
//!
//! Each tool owns a typed input that is parsed from the model's JSON
//! arguments before anything touches the store. Handler failures of every
//! kind, including panics, come back as a structured `{ "error": ... }`
//! result; nothing escapes [`ToolRegistry::dispatch`].

mod create_event;
mod error;
mod get_event;
mod get_events;
mod get_free_slots;
mod next_event;
mod update_event;

pub use create_event::CreateEventTool;
pub use error::ToolError;
pub use get_event::GetEventTool;
pub use get_events::GetEventsTool;
pub use get_free_slots::GetFreeSlotsTool;
pub use next_event::NextUpcomingEventTool;
pub use update_event::UpdateEventTool;

use crate::calendar::{CalendarEvent, CalendarStore};
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Result envelope handed back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub payload: Value,
}

impl ToolOutput {
    pub fn success(payload: Value) -> Self {
        Self {
            success: true,
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: json!({ "error": message.into() }),
        }
    }

    /// Serialized form sent to the model as the tool result content
    pub fn to_content(&self) -> String {
        self.payload.to_string()
    }
}

/// Everything a tool needs for one invocation.
///
/// Built per request; `now` is fixed when the request starts so every tool in
/// a conversation sees the same clock.
#[derive(Clone)]
pub struct ToolContext {
    pub store: Arc<dyn CalendarStore>,
    pub tz: Tz,
    pub now: DateTime<Utc>,
    /// Minimum free-slot length when the model does not ask for one
    pub default_min_slot: Duration,
}

impl ToolContext {
    pub fn new(
        store: Arc<dyn CalendarStore>,
        tz: Tz,
        now: DateTime<Utc>,
        default_min_slot: Duration,
    ) -> Self {
        Self {
            store,
            tz,
            now,
            default_min_slot,
        }
    }

    /// Render an instant in the context's zone
    pub fn local(&self, dt: DateTime<Utc>) -> String {
        dt.with_timezone(&self.tz).to_rfc3339()
    }

    /// JSON view of an event with times in the context's zone
    pub fn event_view(&self, event: &CalendarEvent) -> Value {
        json!({
            "id": event.id,
            "calendarId": event.calendar_id,
            "title": event.title,
            "description": event.description,
            "location": event.location,
            "start": self.local(event.start),
            "end": self.local(event.end),
            "allDay": event.all_day,
            "color": event.color,
        })
    }
}

/// A callable calendar operation
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &'static str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool. Errors are converted to `{error}` by the registry.
    async fn run(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError>;
}

/// Parse tool arguments into the tool's typed input.
///
/// A missing or `null` argument object is read as `{}` so tools without
/// required fields accept it.
pub(crate) fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input).map_err(|e| ToolError::Validation(format!("Invalid input: {e}")))
}

/// Collection of tools available to a conversation
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// The standard calendar tool set
    pub fn calendar() -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(GetEventsTool),
            Arc::new(GetEventTool),
            Arc::new(CreateEventTool),
            Arc::new(UpdateEventTool),
            Arc::new(GetFreeSlotsTool),
            Arc::new(NextUpcomingEventTool),
        ];
        Self { tools }
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Run a tool call and wrap whatever happens in a `ToolOutput`.
    pub async fn dispatch(&self, call: &ToolCall, ctx: &ToolContext) -> ToolOutput {
        let result = match self.tools.iter().find(|t| t.name() == call.name) {
            Some(tool) => AssertUnwindSafe(tool.run(call.arguments.clone(), ctx))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ToolError::Internal(call.name.clone()))),
            None => Err(ToolError::UnknownTool(call.name.clone())),
        };

        match result {
            Ok(payload) => {
                tracing::info!(tool = %call.name, id = %call.id, "Tool call succeeded");
                ToolOutput::success(payload)
            }
            Err(e) => {
                if e.is_fault() {
                    tracing::error!(
                        tool = %call.name,
                        id = %call.id,
                        error = %e,
                        "Tool call failed"
                    );
                } else {
                    tracing::warn!(
                        tool = %call.name,
                        id = %call.id,
                        error = %e,
                        "Tool call rejected"
                    );
                }
                ToolOutput::error(e.to_string())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> &'static str {
            "explode"
        }

        fn description(&self) -> String {
            "Always panics".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        async fn run(&self, _input: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            panic!("boom")
        }
    }

    #[test]
    fn test_calendar_tools_registered() {
        let registry = ToolRegistry::calendar();
        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        for expected in [
            "getEvents",
            "getEvent",
            "createEvent",
            "updateEvent",
            "getFreeSlots",
            "getNextUpcomingEvent",
        ] {
            assert!(names.iter().any(|n| n == expected), "Missing {expected}");
        }
    }

    #[test]
    fn test_schemas_are_objects() {
        for def in ToolRegistry::calendar().definitions() {
            assert_eq!(def.input_schema["type"], "object", "{} schema", def.name);
            assert!(!def.description.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_structured_error() {
        let registry = ToolRegistry::calendar();
        let out = registry
            .dispatch(&ToolCall::new("t1", "deleteEverything", json!({})), &context(vec![]))
            .await;
        assert!(!out.success);
        assert!(out.payload["error"].as_str().unwrap().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let registry = ToolRegistry {
            tools: vec![Arc::new(PanickingTool)],
        };
        let out = registry
            .dispatch(&ToolCall::new("t1", "explode", json!({})), &context(vec![]))
            .await;
        assert!(!out.success);
        assert!(out.payload["error"].is_string());
    }

    #[test]
    fn test_error_output_shape() {
        let out = ToolOutput::error("nope");
        assert_eq!(out.to_content(), r#"{"error":"nope"}"#);
    }
}
