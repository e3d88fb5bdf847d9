//! Property-based tests for the state machine
//!
//! These tests drive whole runs of the loop through `transition` and check
//! the budget and termination invariants.

use super::*;
use crate::tools::{ToolCall, ToolOutput};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

fn calls_for_step(step: usize, count: usize) -> Vec<ToolCall> {
    (0..count)
        .map(|i| ToolCall::new(format!("toolu_{step}_{i}"), "getEvents", json!({})))
        .collect()
}

fn results_for(calls: &[ToolCall]) -> Vec<ToolResult> {
    calls
        .iter()
        .map(|c| ToolResult::new(c, ToolOutput::success(json!({}))))
        .collect()
}

/// Drive a run where turn `i` asks for `plan[i]` tool calls. Turns past the
/// end of the plan are tool-free. Returns the final state and the number of
/// budget decrements observed.
fn run(plan: &[usize], context: &LoopContext) -> (AgentState, u32) {
    let mut state = transition(&AgentState::Idle, context, Event::Start)
        .unwrap()
        .new_state;
    let mut decrements = 0;
    let mut turn = 0;

    while !state.is_terminal() {
        let count = plan.get(turn).copied().unwrap_or(0);
        let calls = calls_for_step(turn, count);
        let after_turn = transition(
            &state,
            context,
            Event::TurnFinished {
                text: format!("turn {turn}"),
                tool_calls: calls.clone(),
            },
        )
        .unwrap();
        state = after_turn.new_state;
        if state.is_terminal() {
            break;
        }

        let before = state.steps_remaining().unwrap();
        let after_tools = transition(
            &state,
            context,
            Event::ToolsCompleted {
                results: results_for(&calls),
            },
        )
        .unwrap();
        state = after_tools.new_state;
        let after = state.steps_remaining().unwrap_or(0);
        decrements += before - after;
        turn += 1;
    }

    (state, decrements)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_three_tool_steps_then_success() {
    let context = LoopContext::new(25);
    let (state, decrements) = run(&[1, 2, 1], &context);
    assert_eq!(state, AgentState::Terminated(Outcome::Success));
    assert_eq!(decrements, 3);
}

#[test]
fn test_always_calling_tools_hits_step_limit() {
    let context = LoopContext::new(25);
    let (state, decrements) = run(&[1; 100], &context);
    assert_eq!(state, AgentState::Terminated(Outcome::StepLimitExceeded));
    assert_eq!(decrements, 25);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Runs whose tool steps fit the budget succeed after exactly that many decrements
    #[test]
    fn prop_success_within_budget(
        plan in proptest::collection::vec(1usize..4, 0..10),
        extra in 1u32..10,
    ) {
        let steps = u32::try_from(plan.len()).unwrap();
        let context = LoopContext::new(steps + extra);
        let (state, decrements) = run(&plan, &context);
        prop_assert_eq!(state, AgentState::Terminated(Outcome::Success));
        prop_assert_eq!(decrements, steps);
    }

    /// Tool-hungry runs stop at exactly `max_steps` decrements
    #[test]
    fn prop_budget_is_hard_ceiling(max_steps in 1u32..40, calls in 1usize..4) {
        let context = LoopContext::new(max_steps);
        let plan = vec![calls; 64];
        let (state, decrements) = run(&plan, &context);
        prop_assert_eq!(state, AgentState::Terminated(Outcome::StepLimitExceeded));
        prop_assert_eq!(decrements, max_steps);
    }

    /// Every terminal transition ends with exactly one Finish effect
    #[test]
    fn prop_terminal_transitions_finish_once(
        steps_remaining in 1u32..30,
        calls in 0usize..4,
        fail in any::<bool>(),
    ) {
        let context = LoopContext::default();
        let state = AgentState::Streaming { steps_remaining };
        let event = if fail {
            Event::Failed { message: "boom".to_string() }
        } else {
            Event::TurnFinished { text: String::new(), tool_calls: calls_for_step(0, calls) }
        };
        let result = transition(&state, &context, event).unwrap();
        let finishes = result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::Finish { .. }))
            .count();
        if result.new_state.is_terminal() {
            prop_assert_eq!(finishes, 1);
        } else {
            prop_assert_eq!(finishes, 0);
        }
    }

    /// The budget never increases across a transition
    #[test]
    fn prop_budget_monotonic(steps_remaining in 1u32..30, calls in 1usize..4) {
        let context = LoopContext::default();
        let calls = calls_for_step(0, calls);
        let state = AgentState::ToolPending { calls: calls.clone(), steps_remaining };
        let event = Event::ToolsCompleted { results: results_for(&calls) };
        let result = transition(&state, &context, event).unwrap();
        let after = result.new_state.steps_remaining().unwrap_or(0);
        prop_assert_eq!(after, steps_remaining - 1);
    }
}
