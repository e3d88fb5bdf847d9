//! getFreeSlots - open time in a date range

use super::{parse_input, Tool, ToolContext, ToolError};
use crate::freebusy::{busy_intervals, compute_free_slots};
use crate::time::{local_day_bounds, normalize_range};
use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct GetFreeSlotsTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetFreeSlotsInput {
    start_date: String,
    end_date: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    min_duration_minutes: Option<i64>,
}

#[async_trait]
impl Tool for GetFreeSlotsTool {
    fn name(&self) -> &'static str {
        "getFreeSlots"
    }

    fn description(&self) -> String {
        "Find free time between two dates. Busy time comes from existing events; all-day events block their whole day. Use startTime/endTime to restrict to working hours. Slots shorter than minDurationMinutes are omitted.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["startDate", "endDate"],
            "properties": {
                "startDate": { "type": "string", "description": "First day, YYYY-MM-DD" },
                "endDate": { "type": "string", "description": "Last day, YYYY-MM-DD" },
                "startTime": { "type": "string", "description": "Window start time, HH:MM" },
                "endTime": { "type": "string", "description": "Window end time, HH:MM" },
                "minDurationMinutes": { "type": "integer", "minimum": 1, "description": "Shortest slot worth returning" }
            }
        })
    }

    async fn run(&self, input: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let input: GetFreeSlotsInput = parse_input(input)?;
        let min_duration = match input.min_duration_minutes {
            Some(minutes) if minutes <= 0 => {
                return Err(ToolError::validation("minDurationMinutes must be positive"))
            }
            Some(minutes) => Duration::try_minutes(minutes)
                .ok_or_else(|| ToolError::validation("minDurationMinutes is too large"))?,
            None => ctx.default_min_slot,
        };

        let window = normalize_range(
            &input.start_date,
            &input.end_date,
            input.start_time.as_deref(),
            input.end_time.as_deref(),
            ctx.tz,
        )?;

        // All-day events may be stored as a bare date, so look across the
        // whole local days the window touches and let clipping trim them.
        let lookup = local_day_bounds(&window, ctx.tz)?;
        let events = ctx.store.list_events(&lookup).await?;
        let busy = busy_intervals(&events, ctx.tz)?;
        let slots = compute_free_slots(&window, &busy, min_duration);

        let free_slots: Vec<Value> = slots
            .iter()
            .map(|slot| {
                json!({
                    "start": ctx.local(slot.start),
                    "end": ctx.local(slot.end),
                    "durationMinutes": slot.duration().num_minutes(),
                })
            })
            .collect();

        Ok(json!({
            "window": { "start": ctx.local(window.start), "end": ctx.local(window.end) },
            "minDurationMinutes": min_duration.num_minutes(),
            "freeSlots": free_slots,
        }))
    }
}
