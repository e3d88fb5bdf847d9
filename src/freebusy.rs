//! Free/busy slot computation
//!
//! Given a window and the busy intervals that fall in it, produce the open
//! slots. All ranges are half-open, so `[09:00, 10:00)` and `[10:00, 11:00)`
//! touch and merge into one busy run.

#[cfg(test)]
mod proptests;

use crate::calendar::CalendarEvent;
use crate::time::{TimeError, TimeRange};
use chrono::Duration;
use chrono_tz::Tz;

/// Open slots in `window` that are at least `min_duration` long.
///
/// Output is sorted, and no two slots overlap or touch.
pub fn compute_free_slots(
    window: &TimeRange,
    busy: &[TimeRange],
    min_duration: Duration,
) -> Vec<TimeRange> {
    let clipped: Vec<TimeRange> = busy.iter().filter_map(|b| b.clip_to(window)).collect();
    let merged = merge_busy(&clipped);

    let mut slots = Vec::with_capacity(merged.len() + 1);
    let mut cursor = window.start;
    for run in &merged {
        if run.start > cursor {
            slots.push(TimeRange {
                start: cursor,
                end: run.start,
            });
        }
        cursor = cursor.max(run.end);
    }
    if window.end > cursor {
        slots.push(TimeRange {
            start: cursor,
            end: window.end,
        });
    }

    slots.retain(|slot| slot.duration() >= min_duration);
    slots
}

/// Sort and coalesce intervals into maximal runs.
///
/// `[a, b)` and `[c, d)` merge when `c <= b`. Zero-length intervals are
/// dropped. Merging an already merged set returns it unchanged.
pub fn merge_busy(intervals: &[TimeRange]) -> Vec<TimeRange> {
    let mut sorted: Vec<TimeRange> = intervals.iter().filter(|r| !r.is_empty()).copied().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut merged: Vec<TimeRange> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Busy intervals for a set of events, widening all-day events to the full
/// local day(s) they span in `tz`.
pub fn busy_intervals(events: &[CalendarEvent], tz: Tz) -> Result<Vec<TimeRange>, TimeError> {
    events.iter().map(|event| event.busy_range(tz)).collect()
}
