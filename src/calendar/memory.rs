//! In-memory calendar store

use super::{
    event_matches, CalendarEvent, CalendarStore, EventPatch, NewEvent, StoreError, StoreResult,
};
use crate::time::TimeRange;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Event store backed by a map. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    events: RwLock<BTreeMap<String, CalendarEvent>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing events, keeping their ids.
    #[allow(dead_code)] // Used in tests
    pub fn with_events(events: impl IntoIterator<Item = CalendarEvent>) -> Self {
        let map = events.into_iter().map(|e| (e.id.clone(), e)).collect();
        Self {
            events: RwLock::new(map),
        }
    }
}

#[async_trait]
impl CalendarStore for InMemoryStore {
    async fn list_events(&self, range: &TimeRange) -> StoreResult<Vec<CalendarEvent>> {
        let events = self.events.read().await;
        let mut matching: Vec<CalendarEvent> = events
            .values()
            .filter(|e| event_matches(e, range))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn get_event(&self, id: &str) -> StoreResult<CalendarEvent> {
        self.events
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<CalendarEvent> {
        let created = event.into_event(uuid::Uuid::new_v4().to_string());
        self.events
            .write()
            .await
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_event(&self, id: &str, patch: EventPatch) -> StoreResult<CalendarEvent> {
        let mut events = self.events.write().await;
        let existing = events
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *existing = patch.apply_to(existing);
        Ok(existing.clone())
    }
}
