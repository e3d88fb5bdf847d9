//! getEvent - fetch one event by id

use super::{parse_input, Tool, ToolContext, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct GetEventTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetEventInput {
    event_id: String,
}

#[async_trait]
impl Tool for GetEventTool {
    fn name(&self) -> &'static str {
        "getEvent"
    }

    fn description(&self) -> String {
        "Fetch a single calendar event by its id.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["eventId"],
            "properties": {
                "eventId": { "type": "string", "description": "Id of the event" }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let input: GetEventInput = parse_input(input)?;
        let event = ctx.store.get_event(&input.event_id).await?;
        Ok(ctx.event_view(&event))
    }
}
