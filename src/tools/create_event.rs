//! createEvent - insert a new event

use super::{parse_input, Tool, ToolContext, ToolError};
use crate::calendar::{NewEvent, DEFAULT_CALENDAR_ID, DEFAULT_COLOR};
use crate::time::parse_instant;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct CreateEventTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventInput {
    #[serde(default)]
    calendar_id: Option<String>,
    title: String,
    start: String,
    end: String,
    #[serde(default)]
    all_day: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

impl CreateEventInput {
    fn into_new_event(self, ctx: &ToolContext) -> Result<NewEvent, ToolError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ToolError::validation("title must not be empty"));
        }

        let start = parse_instant(&self.start, ctx.tz)?;
        let end = parse_instant(&self.end, ctx.tz)?;
        if start > end {
            return Err(ToolError::validation(format!(
                "start ({}) must not be after end ({})",
                self.start, self.end
            )));
        }

        Ok(NewEvent {
            calendar_id: self
                .calendar_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            title,
            description: self.description,
            location: self.location,
            start,
            end,
            all_day: self.all_day,
            color: self
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        })
    }
}

#[async_trait]
impl Tool for CreateEventTool {
    fn name(&self) -> &'static str {
        "createEvent"
    }

    fn description(&self) -> String {
        "Create a calendar event. start and end are ISO 8601 date-times; values without an offset are read in the user's time zone. For all-day events pass dates and set allDay.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["title", "start", "end"],
            "properties": {
                "calendarId": { "type": "string", "description": "Calendar to create the event in (default \"primary\")" },
                "title": { "type": "string" },
                "start": { "type": "string", "description": "Start, ISO 8601" },
                "end": { "type": "string", "description": "End, ISO 8601" },
                "allDay": { "type": "boolean" },
                "description": { "type": "string" },
                "location": { "type": "string" },
                "color": { "type": "string", "description": "Display color (default \"blue\")" }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let input: CreateEventInput = parse_input(input)?;
        let new_event = input.into_new_event(ctx)?;
        let created = ctx.store.create_event(new_event).await?;
        tracing::info!(event_id = %created.id, "Event created");
        Ok(ctx.event_view(&created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeRange;
    use crate::tools::test_support::{context, utc};
    use crate::tools::{ToolCall, ToolRegistry};

    #[tokio::test]
    async fn test_creates_with_defaults() {
        let ctx = context(vec![]);
        let out = CreateEventTool
            .run(
                json!({
                    "title": "Coffee with Sam",
                    "start": "2024-06-03T10:00",
                    "end": "2024-06-03T10:30"
                }),
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(out["calendarId"], "primary");
        assert_eq!(out["color"], "blue");
        assert_eq!(out["allDay"], false);
        assert!(!out["id"].as_str().unwrap().is_empty());

        let window = TimeRange::new(utc(2024, 6, 3, 0, 0), utc(2024, 6, 4, 0, 0)).unwrap();
        let stored = ctx.store.list_events(&window).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].start, utc(2024, 6, 3, 10, 0));
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let ctx = context(vec![]);
        let err = CreateEventTool
            .run(
                json!({
                    "title": "Backwards",
                    "start": "2024-06-03T11:00:00Z",
                    "end": "2024-06-03T10:00:00Z"
                }),
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn test_inverted_range_surfaces_as_error_result() {
        let ctx = context(vec![]);
        let out = ToolRegistry::calendar()
            .dispatch(
                &ToolCall::new(
                    "toolu_1",
                    "createEvent",
                    json!({
                        "title": "Backwards",
                        "start": "2024-06-03T11:00:00Z",
                        "end": "2024-06-03T10:00:00Z"
                    }),
                ),
                &ctx,
            )
            .await;

        assert!(!out.success);
        let message = out.payload["error"].as_str().unwrap();
        assert!(message.contains("Validation error"), "{message}");

        let window = TimeRange::new(utc(2024, 6, 3, 0, 0), utc(2024, 6, 4, 0, 0)).unwrap();
        assert!(ctx.store.list_events(&window).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_title_rejected() {
        let err = CreateEventTool
            .run(
                json!({"title": "  ", "start": "2024-06-03", "end": "2024-06-03"}),
                &context(vec![]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unparseable_start_is_time_error() {
        let err = CreateEventTool
            .run(
                json!({"title": "Sync", "start": "next tuesday", "end": "2024-06-03"}),
                &context(vec![]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidTimeInput(_)));
    }
}
