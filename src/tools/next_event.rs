//! getNextUpcomingEvent - the earliest event at or after now

use super::{Tool, ToolContext, ToolError};
use crate::time::TimeRange;
use async_trait::async_trait;
use chrono::Duration;
use serde_json::{json, Value};

/// How far ahead to look for the next event
const HORIZON_DAYS: i64 = 365;

pub struct NextUpcomingEventTool;

#[async_trait]
impl Tool for NextUpcomingEventTool {
    fn name(&self) -> &'static str {
        "getNextUpcomingEvent"
    }

    fn description(&self) -> String {
        "Get the next event that starts at or after the current time.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn run(&self, _input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let horizon = TimeRange::new(ctx.now, ctx.now + Duration::days(HORIZON_DAYS))?;
        let events = ctx.store.list_events(&horizon).await?;

        let next = events
            .iter()
            .filter(|e| e.start >= ctx.now)
            .min_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        Ok(match next {
            Some(event) => json!({ "event": ctx.event_view(event) }),
            None => json!({ "event": null, "message": "No upcoming events" }),
        })
    }
}
