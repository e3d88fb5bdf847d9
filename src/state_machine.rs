//! Agent loop state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The orchestrator feeds it events and executes the effects it returns.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, ToolResult};
pub use state::{AgentState, LoopContext, Outcome};
pub use transition::{transition, TransitionError, TransitionResult};

/// Final message when the step budget runs out mid-task
pub const STEP_LIMIT_MESSAGE: &str = "I've reached the maximum number of steps for this request. Here's what I have so far. Please ask me to continue if you need more.";
