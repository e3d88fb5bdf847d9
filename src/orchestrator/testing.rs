//! Mock implementations for testing
//!
//! These mocks enable driving the orchestrator without a model or a real
//! calendar backend.

use super::traits::*;
use crate::calendar::{CalendarEvent, CalendarStore, EventPatch, NewEvent, StoreError, StoreResult};
use crate::llm::{LlmError, LlmRequest, LlmStream, StreamEvent, ToolDefinition, Usage};
use crate::time::TimeRange;
use crate::tools::{ToolCall, ToolContext, ToolOutput};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// One scripted model turn
pub enum MockTurn {
    /// Stream these items, in order
    Events(Vec<Result<StreamEvent, LlmError>>),
    /// Fail before any item is streamed
    OpenError(LlmError),
    /// Open a stream that never yields
    Hang,
    /// Never finish opening the stream
    HangOnOpen,
}

/// A turn that streams `text` in the given deltas and ends the turn
pub fn text_turn(deltas: &[&str]) -> MockTurn {
    let mut events: Vec<Result<StreamEvent, LlmError>> = deltas
        .iter()
        .map(|d| Ok(StreamEvent::TextDelta((*d).to_string())))
        .collect();
    events.push(Ok(finish("end_turn")));
    MockTurn::Events(events)
}

/// A turn that requests the given `(id, name, arguments)` tool calls
pub fn tool_turn(calls: &[(&str, &str, Value)]) -> MockTurn {
    let mut events: Vec<Result<StreamEvent, LlmError>> = calls
        .iter()
        .map(|(id, name, input)| {
            Ok(StreamEvent::ToolUse {
                id: (*id).to_string(),
                name: (*name).to_string(),
                input: input.clone(),
            })
        })
        .collect();
    events.push(Ok(finish("tool_use")));
    MockTurn::Events(events)
}

fn finish(stop_reason: &str) -> StreamEvent {
    StreamEvent::Finish {
        stop_reason: Some(stop_reason.to_string()),
        usage: Usage {
            input_tokens: 100,
            output_tokens: 20,
            ..Usage::default()
        },
    }
}

type TurnFactory = Box<dyn Fn(usize) -> MockTurn + Send + Sync>;

/// Mock LLM client that plays queued turns
pub struct MockLlmClient {
    turns: Mutex<VecDeque<MockTurn>>,
    /// Used once the queue is empty; receives the request index
    repeat: Option<TurnFactory>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            repeat: None,
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Build every turn from `factory` once the queue runs dry
    pub fn repeating(
        mut self,
        factory: impl Fn(usize) -> MockTurn + Send + Sync + 'static,
    ) -> Self {
        self.repeat = Some(Box::new(factory));
        self
    }

    pub fn queue_turn(&self, turn: MockTurn) {
        self.turns.lock().unwrap().push_back(turn);
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        let queued = self.turns.lock().unwrap().pop_front();
        let turn = match (queued, &self.repeat) {
            (Some(turn), _) => turn,
            (None, Some(factory)) => factory(index),
            (None, None) => return Err(LlmError::unknown("No mock turn queued")),
        };

        match turn {
            MockTurn::Events(events) => Ok(futures::stream::iter(events).boxed()),
            MockTurn::OpenError(e) => Err(e),
            MockTurn::Hang => {
                Ok(futures::stream::pending::<Result<StreamEvent, LlmError>>().boxed())
            }
            MockTurn::HangOnOpen => futures::future::pending().await,
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Tool Executor
// ============================================================================

/// Executor that sleeps for `arguments.delayMs` and echoes the call id.
///
/// Lets tests make later calls finish first.
pub struct DelayedExecutor;

#[async_trait]
impl ToolExecutor for DelayedExecutor {
    async fn execute(&self, call: &ToolCall, _ctx: &ToolContext) -> ToolOutput {
        let delay = call.arguments["delayMs"].as_u64().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        ToolOutput::success(json!({ "id": call.id }))
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![]
    }
}

// ============================================================================
// Mock Calendar Store
// ============================================================================

/// Store whose backend is always down
pub struct FailingStore;

#[async_trait]
impl CalendarStore for FailingStore {
    async fn list_events(&self, _range: &TimeRange) -> StoreResult<Vec<CalendarEvent>> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn get_event(&self, _id: &str) -> StoreResult<CalendarEvent> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn create_event(&self, _event: NewEvent) -> StoreResult<CalendarEvent> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn update_event(&self, _id: &str, _patch: EventPatch) -> StoreResult<CalendarEvent> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}
