//! System prompt construction
//!
//! The model has no clock of its own. Every request gets a prompt that pins
//! the current instant, the user's local date and the resolved time zone so
//! relative phrases ("tomorrow", "next Friday") resolve the same way the
//! tools will interpret them.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt::Write;

/// Base system prompt establishing the agent's role
const BASE_PROMPT: &str = r"You are a calendar assistant. You help the user understand and manage their schedule using the calendar tools available to you.

Guidelines:
- Look things up with tools instead of guessing. Call getEvents before answering questions about a day or range, and getFreeSlots before proposing meeting times.
- Dates passed to tools are YYYY-MM-DD and times are HH:MM, both in the user's time zone unless you include an explicit offset.
- Before creating or moving an event, make sure start is not after end.
- If a tool returns an error, read it, correct your arguments and try again, or explain the problem to the user.
- Independent lookups can be requested together in one step.
- Keep answers short. Present times in the user's time zone and in a readable form (e.g. Tuesday 3 June, 14:00-15:00).";

/// Build the system prompt for a request starting at `now` in `tz`.
pub fn build_system_prompt(now: DateTime<Utc>, tz: Tz) -> String {
    let local = now.with_timezone(&tz);
    let mut prompt = String::from(BASE_PROMPT);

    prompt.push_str("\n\n<context>\n");
    let _ = writeln!(prompt, "Current time (UTC): {}", now.to_rfc3339());
    let _ = writeln!(prompt, "Current local time: {}", local.to_rfc3339());
    let _ = writeln!(prompt, "Today is {}", local.format("%A, %B %-d, %Y"));
    let _ = writeln!(prompt, "Time zone: {} ({})", tz.name(), local.format("%:z"));
    prompt.push_str("</context>");

    prompt
}
