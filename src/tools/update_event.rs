//! updateEvent - partial update of an existing event

use super::{parse_input, Tool, ToolContext, ToolError};
use crate::calendar::EventPatch;
use crate::time::parse_instant;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct UpdateEventTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEventInput {
    event_id: String,
    #[serde(default)]
    calendar_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    all_day: Option<bool>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

impl UpdateEventInput {
    fn patch(&self, ctx: &ToolContext) -> Result<EventPatch, ToolError> {
        let start = self.start.as_deref().map(|raw| parse_instant(raw, ctx.tz)).transpose()?;
        let end = self.end.as_deref().map(|raw| parse_instant(raw, ctx.tz)).transpose()?;
        Ok(EventPatch {
            calendar_id: self.calendar_id.clone(),
            title: self.title.as_ref().map(|t| t.trim().to_string()),
            description: self.description.clone(),
            location: self.location.clone(),
            start,
            end,
            all_day: self.all_day,
            color: self.color.clone(),
        })
    }
}

#[async_trait]
impl Tool for UpdateEventTool {
    fn name(&self) -> &'static str {
        "updateEvent"
    }

    fn description(&self) -> String {
        "Update an existing event. Only the fields you pass are changed; everything else is kept.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["eventId"],
            "properties": {
                "eventId": { "type": "string" },
                "calendarId": { "type": "string" },
                "title": { "type": "string" },
                "start": { "type": "string", "description": "New start, ISO 8601" },
                "end": { "type": "string", "description": "New end, ISO 8601" },
                "allDay": { "type": "boolean" },
                "description": { "type": "string" },
                "location": { "type": "string" },
                "color": { "type": "string" }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let input: UpdateEventInput = parse_input(input)?;
        let patch = input.patch(ctx)?;
        if patch.is_empty() {
            return Err(ToolError::validation("no fields to update"));
        }

        let current = ctx.store.get_event(&input.event_id).await?;
        let merged = patch.apply_to(&current);
        if merged.title.is_empty() {
            return Err(ToolError::validation("title must not be empty"));
        }
        if merged.start > merged.end {
            return Err(ToolError::validation(format!(
                "start ({}) must not be after end ({}) after update",
                ctx.local(merged.start),
                ctx.local(merged.end)
            )));
        }

        let updated = ctx.store.update_event(&input.event_id, patch).await?;
        tracing::info!(event_id = %updated.id, "Event updated");
        Ok(ctx.event_view(&updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{context, event, utc};

    fn seeded() -> crate::tools::ToolContext {
        context(vec![event(
            "evt-1",
            "Planning",
            utc(2024, 6, 3, 9, 0),
            utc(2024, 6, 3, 10, 0),
        )])
    }

    #[tokio::test]
    async fn test_only_provided_fields_change() {
        let ctx = seeded();
        let out = UpdateEventTool
            .run(json!({"eventId": "evt-1", "location": "Room 4"}), &ctx)
            .await
            .unwrap();

        assert_eq!(out["location"], "Room 4");
        assert_eq!(out["title"], "Planning");
        assert_eq!(out["start"], "2024-06-03T09:00:00+00:00");

        let stored = ctx.store.get_event("evt-1").await.unwrap();
        assert_eq!(stored.location.as_deref(), Some("Room 4"));
        assert_eq!(stored.end, utc(2024, 6, 3, 10, 0));
    }

    #[tokio::test]
    async fn test_merge_revalidated() {
        let ctx = seeded();
        // Moving only the start past the existing end must fail.
        let err = UpdateEventTool
            .run(json!({"eventId": "evt-1", "start": "2024-06-03T11:00:00Z"}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));

        let stored = ctx.store.get_event("evt-1").await.unwrap();
        assert_eq!(stored.start, utc(2024, 6, 3, 9, 0));
    }

    #[tokio::test]
    async fn test_moving_both_ends_succeeds() {
        let ctx = seeded();
        let out = UpdateEventTool
            .run(
                json!({
                    "eventId": "evt-1",
                    "start": "2024-06-03T11:00:00Z",
                    "end": "2024-06-03T12:00:00Z"
                }),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(out["end"], "2024-06-03T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_missing_event() {
        let err = UpdateEventTool
            .run(json!({"eventId": "ghost", "title": "x"}), &seeded())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_patch_rejected() {
        let err = UpdateEventTool
            .run(json!({"eventId": "evt-1"}), &seeded())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }
}
