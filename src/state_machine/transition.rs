//! Pure state transition function

use super::{AgentState, Effect, Event, LoopContext, Outcome, ToolResult};
use crate::tools::ToolCall;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: AgentState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: AgentState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Agent loop already terminated")]
    AlreadyTerminated,
    #[error("Tool results do not match pending calls: expected [{expected}], got [{got}]")]
    ResultMismatch { expected: String, got: String },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &AgentState,
    context: &LoopContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    if state.is_terminal() {
        return Err(TransitionError::AlreadyTerminated);
    }

    match (state, event) {
        // Idle + Start -> Streaming
        (AgentState::Idle, Event::Start) => {
            if context.max_steps == 0 {
                return Ok(step_limit_reached(vec![]));
            }
            Ok(TransitionResult::new(AgentState::Streaming {
                steps_remaining: context.max_steps,
            })
            .with_effect(Effect::RequestModel))
        }

        // Tool-free turn ends the loop
        (AgentState::Streaming { .. }, Event::TurnFinished { text, tool_calls })
            if tool_calls.is_empty() =>
        {
            Ok(TransitionResult::new(AgentState::Terminated(Outcome::Success))
                .with_effect(Effect::AppendAssistant {
                    text,
                    tool_calls: vec![],
                })
                .with_effect(Effect::finish(Outcome::Success)))
        }

        // Streaming + tool calls -> ToolPending
        (AgentState::Streaming { steps_remaining }, Event::TurnFinished { text, tool_calls }) => {
            Ok(TransitionResult::new(AgentState::ToolPending {
                calls: tool_calls.clone(),
                steps_remaining: *steps_remaining,
            })
            .with_effect(Effect::AppendAssistant {
                text,
                tool_calls: tool_calls.clone(),
            })
            .with_effect(Effect::DispatchTools { calls: tool_calls }))
        }

        // ToolPending + all results -> Streaming, or out of budget
        (
            AgentState::ToolPending {
                calls,
                steps_remaining,
            },
            Event::ToolsCompleted { results },
        ) => {
            check_results(calls, &results)?;
            let remaining = steps_remaining.saturating_sub(1);
            if remaining == 0 {
                return Ok(step_limit_reached(results));
            }
            Ok(TransitionResult::new(AgentState::Streaming {
                steps_remaining: remaining,
            })
            .with_effect(Effect::AppendToolResults { results })
            .with_effect(Effect::RequestModel))
        }

        // Any running state + failure -> Error
        (_, Event::Failed { message }) => {
            let outcome = Outcome::Error { message };
            Ok(TransitionResult::new(AgentState::Terminated(outcome.clone()))
                .with_effect(Effect::finish(outcome)))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} cannot handle {}",
            state.name(),
            event_name(&event)
        ))),
    }
}

fn step_limit_reached(results: Vec<ToolResult>) -> TransitionResult {
    let mut result = TransitionResult::new(AgentState::Terminated(Outcome::StepLimitExceeded));
    if !results.is_empty() {
        result = result.with_effect(Effect::AppendToolResults { results });
    }
    result
        .with_effect(Effect::EmitStepLimitMessage)
        .with_effect(Effect::finish(Outcome::StepLimitExceeded))
}

/// Results must answer the pending calls one-to-one, in issue order.
fn check_results(calls: &[ToolCall], results: &[ToolResult]) -> Result<(), TransitionError> {
    let matches = calls.len() == results.len()
        && calls
            .iter()
            .zip(results)
            .all(|(call, result)| call.id == result.tool_use_id);
    if matches {
        return Ok(());
    }
    Err(TransitionError::ResultMismatch {
        expected: calls.iter().map(|c| c.id.as_str()).collect::<Vec<_>>().join(", "),
        got: results
            .iter()
            .map(|r| r.tool_use_id.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Start => "start",
        Event::TurnFinished { .. } => "turn_finished",
        Event::ToolsCompleted { .. } => "tools_completed",
        Event::Failed { .. } => "failed",
    }
}
