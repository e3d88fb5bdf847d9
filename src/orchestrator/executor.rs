//! Orchestrator executor: runs the state machine and executes its effects

use super::chunker::split_words;
use super::{ChatEvent, LlmClient, OrchestratorError, ToolExecutor, WordChunker};
use crate::llm::{ContentBlock, LlmMessage, LlmRequest, StreamEvent, SystemContent, Usage};
use crate::state_machine::state::DEFAULT_MAX_STEPS;
use crate::state_machine::{
    transition, AgentState, Effect, Event, LoopContext, Outcome, ToolResult, TransitionError,
    STEP_LIMIT_MESSAGE,
};
use crate::system_prompt::build_system_prompt;
use crate::tools::{ToolCall, ToolContext};
use futures::future::join_all;
use futures::StreamExt;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Settings fixed when the orchestrator is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub max_steps: u32,
    /// Wall-clock bound on the whole request
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            timeout: Duration::from_secs(30),
            max_tokens: None,
        }
    }
}

/// Drives one chat request at a time; cheap to share behind an `Arc`.
pub struct Orchestrator<L: LlmClient, T: ToolExecutor> {
    llm: L,
    tools: T,
    config: OrchestratorConfig,
}

/// Mutable bookkeeping for a single request
struct RunState {
    history: Vec<LlmMessage>,
    system_prompt: String,
    usage: Usage,
    steps_taken: u32,
}

impl<L: LlmClient, T: ToolExecutor> Orchestrator<L, T> {
    pub fn new(llm: L, tools: T, config: OrchestratorConfig) -> Self {
        Self { llm, tools, config }
    }

    /// Run a request to completion, streaming client events into `sink`.
    ///
    /// Ends on a terminal state, on timeout, or when `cancel` fires. Timeouts
    /// and model failures also send a public `error` event; cancellation
    /// sends nothing since nobody is listening.
    pub async fn run(
        &self,
        history: Vec<LlmMessage>,
        ctx: ToolContext,
        sink: mpsc::Sender<ChatEvent>,
        cancel: CancellationToken,
    ) -> Result<Outcome, OrchestratorError> {
        let started = Instant::now();
        tracing::info!(
            model = %self.llm.model_id(),
            messages = history.len(),
            max_steps = self.config.max_steps,
            "Starting chat request"
        );

        let limit = self.config.timeout;
        let result = tokio::select! {
            () = cancel.cancelled() => Err(OrchestratorError::Cancelled),
            r = tokio::time::timeout(limit, self.drive(history, &ctx, &sink)) => {
                r.unwrap_or_else(|_| Err(OrchestratorError::Timeout(limit)))
            }
        };

        let duration_ms = started.elapsed().as_millis();
        match &result {
            Ok(outcome) => {
                tracing::info!(
                    outcome = ?outcome,
                    duration_ms = %duration_ms,
                    "Chat request finished"
                );
            }
            Err(OrchestratorError::Cancelled | OrchestratorError::ClientGone) => {
                tracing::info!(duration_ms = %duration_ms, "Chat request abandoned by client");
            }
            Err(e) => {
                tracing::error!(error = %e, duration_ms = %duration_ms, "Chat request failed");
                let _ = sink.send(ChatEvent::public_error()).await;
            }
        }
        result
    }

    async fn drive(
        &self,
        history: Vec<LlmMessage>,
        ctx: &ToolContext,
        sink: &mpsc::Sender<ChatEvent>,
    ) -> Result<Outcome, OrchestratorError> {
        let context = LoopContext::new(self.config.max_steps);
        let mut run = RunState {
            history,
            system_prompt: build_system_prompt(ctx.now, ctx.tz),
            usage: Usage::default(),
            steps_taken: 0,
        };
        let mut state = AgentState::Idle;
        let mut events = VecDeque::from([Event::Start]);

        while let Some(event) = events.pop_front() {
            let result = transition(&state, &context, event)?;
            tracing::debug!(
                from = state.name(),
                to = result.new_state.name(),
                steps_remaining = ?result.new_state.steps_remaining(),
                "Transition"
            );
            state = result.new_state;

            for effect in result.effects {
                if let Some(next) = self.execute_effect(effect, &mut run, ctx, sink).await? {
                    events.push_back(next);
                }
            }
        }

        tracing::debug!(
            steps = run.steps_taken,
            input_tokens = run.usage.input_tokens,
            output_tokens = run.usage.output_tokens,
            "Agent loop done"
        );
        match state {
            AgentState::Terminated(outcome) => Ok(outcome),
            other => Err(TransitionError::InvalidTransition(format!(
                "loop stopped in {}",
                other.name()
            ))
            .into()),
        }
    }

    async fn execute_effect(
        &self,
        effect: Effect,
        run: &mut RunState,
        ctx: &ToolContext,
        sink: &mpsc::Sender<ChatEvent>,
    ) -> Result<Option<Event>, OrchestratorError> {
        match effect {
            Effect::RequestModel => self.stream_turn(run, sink).await.map(Some),

            Effect::AppendAssistant { text, tool_calls } => {
                let mut content = Vec::with_capacity(tool_calls.len() + 1);
                if !text.is_empty() {
                    content.push(ContentBlock::text(text));
                }
                content.extend(
                    tool_calls
                        .into_iter()
                        .map(|c| ContentBlock::tool_use(c.id, c.name, c.arguments)),
                );
                if !content.is_empty() {
                    run.history.push(LlmMessage::assistant(content));
                }
                Ok(None)
            }

            Effect::DispatchTools { calls } => {
                run.steps_taken += 1;
                tracing::debug!(count = calls.len(), step = run.steps_taken, "Dispatching tools");

                // Completion order varies; zip restores issue order.
                let outputs =
                    join_all(calls.iter().map(|call| self.tools.execute(call, ctx))).await;

                let mut results = Vec::with_capacity(calls.len());
                for (call, output) in calls.iter().zip(outputs) {
                    emit(
                        sink,
                        ChatEvent::ToolResult {
                            tool_call_id: call.id.clone(),
                            name: call.name.clone(),
                            success: output.success,
                            result: output.payload.clone(),
                        },
                    )
                    .await?;
                    results.push(ToolResult::new(call, output));
                }
                Ok(Some(Event::ToolsCompleted { results }))
            }

            Effect::AppendToolResults { results } => {
                let content = results
                    .into_iter()
                    .map(|r| {
                        let content = r.output.to_content();
                        ContentBlock::tool_result(r.tool_use_id, content, !r.output.success)
                    })
                    .collect();
                run.history.push(LlmMessage::user(content));
                Ok(None)
            }

            Effect::EmitStepLimitMessage => {
                tracing::warn!(steps = run.steps_taken, "Step limit reached");
                let message_id = new_message_id();
                emit(
                    sink,
                    ChatEvent::MessageStart {
                        message_id: message_id.clone(),
                    },
                )
                .await?;
                for delta in split_words(STEP_LIMIT_MESSAGE) {
                    emit(
                        sink,
                        ChatEvent::Text {
                            message_id: message_id.clone(),
                            delta,
                        },
                    )
                    .await?;
                }
                Ok(None)
            }

            Effect::Finish { outcome } => {
                let event = match outcome {
                    Outcome::Success => ChatEvent::Finish { reason: "stop" },
                    Outcome::StepLimitExceeded => ChatEvent::Finish {
                        reason: "step_limit",
                    },
                    Outcome::Error { message } => {
                        tracing::error!(error = %message, "Agent loop terminated with error");
                        ChatEvent::public_error()
                    }
                };
                emit(sink, event).await?;
                Ok(None)
            }
        }
    }

    /// Stream one model turn, forwarding text and tool calls as they arrive.
    ///
    /// Model failures become `Event::Failed`; only a gone client is an error.
    async fn stream_turn(
        &self,
        run: &mut RunState,
        sink: &mpsc::Sender<ChatEvent>,
    ) -> Result<Event, OrchestratorError> {
        let request = LlmRequest {
            system: vec![SystemContent::cached(run.system_prompt.clone())],
            messages: run.history.clone(),
            tools: self.tools.definitions(),
            max_tokens: self.config.max_tokens,
        };

        let mut stream = match self.llm.stream(&request).await {
            Ok(stream) => stream,
            Err(e) => return Ok(Event::Failed { message: e.to_string() }),
        };

        let message_id = new_message_id();
        emit(
            sink,
            ChatEvent::MessageStart {
                message_id: message_id.clone(),
            },
        )
        .await?;

        let mut chunker = WordChunker::new();
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        let mut finished = false;

        while let Some(item) = stream.next().await {
            match item {
                Ok(StreamEvent::TextDelta(delta)) => {
                    text.push_str(&delta);
                    for chunk in chunker.push(&delta) {
                        emit_text(sink, &message_id, chunk).await?;
                    }
                }
                Ok(StreamEvent::ToolUse { id, name, input }) => {
                    if let Some(rest) = chunker.flush() {
                        emit_text(sink, &message_id, rest).await?;
                    }
                    emit(
                        sink,
                        ChatEvent::ToolCall {
                            message_id: message_id.clone(),
                            tool_call_id: id.clone(),
                            name: name.clone(),
                            arguments: input.clone(),
                        },
                    )
                    .await?;
                    tool_calls.push(ToolCall::new(id, name, input));
                }
                Ok(StreamEvent::Finish { usage, .. }) => {
                    run.usage.add(&usage);
                    finished = true;
                    break;
                }
                Err(e) => return Ok(Event::Failed { message: e.to_string() }),
            }
        }

        if !finished {
            return Ok(Event::Failed {
                message: "stream ended before message_stop".to_string(),
            });
        }

        if let Some(rest) = chunker.flush() {
            emit_text(sink, &message_id, rest).await?;
        }
        Ok(Event::TurnFinished { text, tool_calls })
    }
}

/// Time-ordered id for an assistant message
fn new_message_id() -> String {
    Uuid::now_v7().to_string()
}

async fn emit(sink: &mpsc::Sender<ChatEvent>, event: ChatEvent) -> Result<(), OrchestratorError> {
    sink.send(event)
        .await
        .map_err(|_| OrchestratorError::ClientGone)
}

async fn emit_text(
    sink: &mpsc::Sender<ChatEvent>,
    message_id: &str,
    delta: String,
) -> Result<(), OrchestratorError> {
    emit(
        sink,
        ChatEvent::Text {
            message_id: message_id.to_string(),
            delta,
        },
    )
    .await
}
