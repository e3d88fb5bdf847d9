//! Calendar events and the store collaborator
//!
//! The core never owns event data; every read and write goes through
//! [`CalendarStore`]. Two adapters ship with the crate: an in-memory store
//! for tests and ephemeral servers, and a `SQLite` store.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::time::{local_day_bounds, TimeError, TimeRange};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_COLOR: &str = "blue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub color: String,
}

impl CalendarEvent {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }

    /// The interval this event blocks. All-day events block every local
    /// day they touch.
    pub fn busy_range(&self, tz: Tz) -> Result<TimeRange, TimeError> {
        let range = TimeRange::new(self.start, self.end)?;
        if self.all_day {
            local_day_bounds(&range, tz)
        } else {
            Ok(range)
        }
    }
}

/// Fields for a new event; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub calendar_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub color: String,
}

impl NewEvent {
    pub fn into_event(self, id: String) -> CalendarEvent {
        CalendarEvent {
            id,
            calendar_id: self.calendar_id,
            title: self.title,
            description: self.description,
            location: self.location,
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            color: self.color,
        }
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub calendar_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub color: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }

    /// Apply the provided fields to `event`, leaving the rest as they were.
    pub fn apply_to(&self, event: &CalendarEvent) -> CalendarEvent {
        let mut merged = event.clone();
        if let Some(calendar_id) = &self.calendar_id {
            merged.calendar_id.clone_from(calendar_id);
        }
        if let Some(title) = &self.title {
            merged.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            merged.description = Some(description.clone());
        }
        if let Some(location) = &self.location {
            merged.location = Some(location.clone());
        }
        if let Some(start) = self.start {
            merged.start = start;
        }
        if let Some(end) = self.end {
            merged.end = end;
        }
        if let Some(all_day) = self.all_day {
            merged.all_day = all_day;
        }
        if let Some(color) = &self.color {
            merged.color.clone_from(color);
        }
        merged
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Event not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for calendar events.
///
/// Implementations own consistency (including any double-booking rules) and
/// must tolerate a write that was committed but never acknowledged.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Events overlapping `range`
    async fn list_events(&self, range: &TimeRange) -> StoreResult<Vec<CalendarEvent>>;

    async fn get_event(&self, id: &str) -> StoreResult<CalendarEvent>;

    async fn create_event(&self, event: NewEvent) -> StoreResult<CalendarEvent>;

    async fn update_event(&self, id: &str, patch: EventPatch) -> StoreResult<CalendarEvent>;
}

#[async_trait]
impl<T: CalendarStore + ?Sized> CalendarStore for Arc<T> {
    async fn list_events(&self, range: &TimeRange) -> StoreResult<Vec<CalendarEvent>> {
        (**self).list_events(range).await
    }

    async fn get_event(&self, id: &str) -> StoreResult<CalendarEvent> {
        (**self).get_event(id).await
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<CalendarEvent> {
        (**self).create_event(event).await
    }

    async fn update_event(&self, id: &str, patch: EventPatch) -> StoreResult<CalendarEvent> {
        (**self).update_event(id, patch).await
    }
}

/// True when `event` should be returned for a query over `range`.
///
/// Zero-length events match when their instant lies within `range`,
/// bounds included.
pub(crate) fn event_matches(event: &CalendarEvent, range: &TimeRange) -> bool {
    if event.start == event.end {
        return range.start <= event.start && event.start <= range.end;
    }
    event.range().overlaps(range)
}
