//! `SQLite`-backed calendar store

use super::{CalendarEvent, CalendarStore, EventPatch, NewEvent, StoreError, StoreResult};
use crate::time::TimeRange;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    calendar_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    location TEXT,
    start_at TEXT NOT NULL,
    end_at TEXT NOT NULL,
    all_day INTEGER NOT NULL DEFAULT 0,
    color TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_at);
";

const SELECT_COLUMNS: &str =
    "id, calendar_id, title, description, location, start_at, end_at, all_day, color";

/// Thread-safe store handle
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("connection lock poisoned".to_string()))
    }

    fn fetch(conn: &Connection, id: &str) -> StoreResult<CalendarEvent> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM events WHERE id = ?1");
        conn.query_row(&sql, params![id], row_to_event)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl CalendarStore for SqliteStore {
    async fn list_events(&self, range: &TimeRange) -> StoreResult<Vec<CalendarEvent>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM events
             WHERE (start_at < ?2 AND end_at > ?1)
                OR (start_at = end_at AND start_at >= ?1 AND start_at <= ?2)
             ORDER BY start_at, id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let events = stmt
            .query_map(params![format_ts(range.start), format_ts(range.end)], row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    async fn get_event(&self, id: &str) -> StoreResult<CalendarEvent> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<CalendarEvent> {
        let created = event.into_event(uuid::Uuid::new_v4().to_string());
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO events (id, calendar_id, title, description, location, start_at, end_at, all_day, color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                created.id,
                created.calendar_id,
                created.title,
                created.description,
                created.location,
                format_ts(created.start),
                format_ts(created.end),
                created.all_day,
                created.color,
            ],
        )?;
        Ok(created)
    }

    async fn update_event(&self, id: &str, patch: EventPatch) -> StoreResult<CalendarEvent> {
        let conn = self.lock()?;
        let merged = patch.apply_to(&Self::fetch(&conn, id)?);
        conn.execute(
            "UPDATE events SET calendar_id = ?2, title = ?3, description = ?4, location = ?5,
                    start_at = ?6, end_at = ?7, all_day = ?8, color = ?9
             WHERE id = ?1",
            params![
                merged.id,
                merged.calendar_id,
                merged.title,
                merged.description,
                merged.location,
                format_ts(merged.start),
                format_ts(merged.end),
                merged.all_day,
                merged.color,
            ],
        )?;
        Ok(merged)
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<CalendarEvent> {
    Ok(CalendarEvent {
        id: row.get(0)?,
        calendar_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        start: parse_ts(&row.get::<_, String>(5)?, 5)?,
        end: parse_ts(&row.get::<_, String>(6)?, 6)?,
        all_day: row.get(7)?,
        color: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DEFAULT_CALENDAR_ID, DEFAULT_COLOR};
    use chrono::TimeZone;

    fn new_event(title: &str, start_h: u32, end_h: u32) -> NewEvent {
        NewEvent {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            title: title.to_string(),
            description: Some("notes".to_string()),
            location: None,
            start: Utc.with_ymd_and_hms(2024, 6, 1, start_h, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 1, end_h, 0, 0).unwrap(),
            all_day: false,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    fn range(start_h: u32, end_h: u32) -> TimeRange {
        TimeRange::new(
            Utc.with_ymd_and_hms(2024, 6, 1, start_h, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, end_h, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar.db");

        let created = {
            let store = SqliteStore::open(&path).unwrap();
            store.create_event(new_event("Dentist", 14, 15)).await.unwrap()
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let fetched = reopened.get_event(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_list_only_overlapping() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_event(new_event("Early", 7, 8)).await.unwrap();
        store.create_event(new_event("Mid", 10, 12)).await.unwrap();
        store.create_event(new_event("Late", 18, 19)).await.unwrap();

        let events = store.list_events(&range(9, 17)).await.unwrap();
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Mid"]);
    }

    #[tokio::test]
    async fn test_update_and_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let created = store.create_event(new_event("Dentist", 14, 15)).await.unwrap();

        let updated = store
            .update_event(
                &created.id,
                EventPatch {
                    location: Some("Main St".to_string()),
                    ..EventPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Main St"));
        assert_eq!(updated.description.as_deref(), Some("notes"));

        let err = store
            .update_event("missing", EventPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
