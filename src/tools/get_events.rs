//! getEvents - list events in a date range

use super::{parse_input, Tool, ToolContext, ToolError};
use crate::time::normalize_range;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct GetEventsTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetEventsInput {
    start_date: String,
    end_date: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

#[async_trait]
impl Tool for GetEventsTool {
    fn name(&self) -> &'static str {
        "getEvents"
    }

    fn description(&self) -> String {
        "List calendar events between two dates (inclusive). Dates are YYYY-MM-DD in the user's time zone. Optionally narrow the range with startTime/endTime (HH:MM). Events are returned sorted by start time.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["startDate", "endDate"],
            "properties": {
                "startDate": { "type": "string", "description": "First day, YYYY-MM-DD" },
                "endDate": { "type": "string", "description": "Last day, YYYY-MM-DD" },
                "startTime": { "type": "string", "description": "Optional start time of day, HH:MM (default 00:00)" },
                "endTime": { "type": "string", "description": "Optional end time of day, HH:MM (default 23:59:59)" }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let input: GetEventsInput = parse_input(input)?;
        let range = normalize_range(
            &input.start_date,
            &input.end_date,
            input.start_time.as_deref(),
            input.end_time.as_deref(),
            ctx.tz,
        )?;

        let mut events = ctx.store.list_events(&range).await?;
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        let views: Vec<Value> = events.iter().map(|e| ctx.event_view(e)).collect();
        Ok(json!({
            "count": views.len(),
            "events": views,
        }))
    }
}
