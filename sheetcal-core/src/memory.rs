//! In-memory table source and calendar store.
//!
//! Used by the test suite and handy for embedding the engine without any
//! provider binaries installed.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{SheetCalError, SheetCalResult};
use crate::event::Event;
use crate::source::{TableRef, TableSource};
use crate::store::{CalendarRef, CalendarStore, RemoteEvent};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Counts of store writes, for asserting idempotence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl WriteCounts {
    pub fn total(&self) -> usize {
        self.inserts + self.updates + self.deletes
    }
}

#[derive(Debug, Default)]
struct StoreState {
    /// Calendar name -> id
    calendars: BTreeMap<String, String>,
    /// Calendar id -> events in insertion order
    events: BTreeMap<String, Vec<RemoteEvent>>,
    next_id: usize,
    writes: WriteCounts,
    failing_summaries: HashSet<String>,
    offset_suffix: Option<String>,
    write_delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append this UTC offset to timed values when events are read back,
    /// the way hosted calendar APIs do.
    pub fn with_offset_suffix(self, suffix: &str) -> Self {
        lock(&self.state).offset_suffix = Some(suffix.to_string());
        self
    }

    /// Sleep this long before every write, like a slow calendar API.
    pub fn with_write_delay(self, delay: Duration) -> Self {
        lock(&self.state).write_delay = Some(delay);
        self
    }

    async fn pause(&self) {
        let delay = lock(&self.state).write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Make every write touching an event with this summary fail.
    pub fn fail_writes_for(&self, summary: &str) {
        lock(&self.state)
            .failing_summaries
            .insert(summary.to_string());
    }

    /// Put an event straight into a calendar, bypassing write counts.
    pub fn seed(&self, calendar_name: &str, event: Event) -> String {
        let mut state = lock(&self.state);
        let calendar_id = state.calendar_id(calendar_name);
        let id = state.next_event_id();
        state
            .events
            .entry(calendar_id)
            .or_default()
            .push(RemoteEvent { id: id.clone(), event });
        id
    }

    /// Events in a calendar, as stored (without the read-back offset).
    pub fn events(&self, calendar_name: &str) -> Vec<RemoteEvent> {
        let state = lock(&self.state);
        state
            .calendars
            .get(calendar_name)
            .and_then(|id| state.events.get(id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn calendar_names(&self) -> Vec<String> {
        lock(&self.state).calendars.keys().cloned().collect()
    }

    pub fn writes(&self) -> WriteCounts {
        lock(&self.state).writes
    }

    pub fn reset_writes(&self) {
        lock(&self.state).writes = WriteCounts::default();
    }
}

impl StoreState {
    fn calendar_id(&mut self, name: &str) -> String {
        if let Some(id) = self.calendars.get(name) {
            return id.clone();
        }
        let id = format!("cal-{}", self.calendars.len() + 1);
        self.calendars.insert(name.to_string(), id.clone());
        id
    }

    fn next_event_id(&mut self) -> String {
        self.next_id += 1;
        format!("evt-{}", self.next_id)
    }

    fn check_writable(&self, summary: &str) -> SheetCalResult<()> {
        if self.failing_summaries.contains(summary.trim()) {
            return Err(SheetCalError::Store(format!("write rejected for '{}'", summary)));
        }
        Ok(())
    }

    fn calendar_events(&mut self, calendar: &CalendarRef) -> SheetCalResult<&mut Vec<RemoteEvent>> {
        self.events
            .get_mut(&calendar.id)
            .ok_or_else(|| SheetCalError::Store(format!("unknown calendar '{}'", calendar.id)))
    }
}

fn with_offset(mut remote: RemoteEvent, suffix: Option<&str>) -> RemoteEvent {
    if let Some(suffix) = suffix {
        for time in [&mut remote.event.start, &mut remote.event.end] {
            if let crate::event::EventTime::DateTime { date_time, .. } = time {
                date_time.push_str(suffix);
            }
        }
    }
    remote
}

impl CalendarStore for MemoryStore {
    async fn resolve_or_create_calendar(&self, name: &str) -> SheetCalResult<CalendarRef> {
        let mut state = lock(&self.state);
        let id = state.calendar_id(name);
        state.events.entry(id.clone()).or_default();
        Ok(CalendarRef {
            id,
            name: name.to_string(),
        })
    }

    async fn list_events(&self, calendar: &CalendarRef) -> SheetCalResult<Vec<RemoteEvent>> {
        let mut state = lock(&self.state);
        let suffix = state.offset_suffix.clone();
        let events = state.calendar_events(calendar)?.clone();
        Ok(events
            .into_iter()
            .map(|e| with_offset(e, suffix.as_deref()))
            .collect())
    }

    async fn insert_event(&self, calendar: &CalendarRef, event: &Event) -> SheetCalResult<String> {
        self.pause().await;
        let mut state = lock(&self.state);
        state.check_writable(&event.summary)?;
        let id = state.next_event_id();
        state.calendar_events(calendar)?.push(RemoteEvent {
            id: id.clone(),
            event: event.clone(),
        });
        state.writes.inserts += 1;
        Ok(id)
    }

    async fn update_event(
        &self,
        calendar: &CalendarRef,
        event_id: &str,
        event: &Event,
    ) -> SheetCalResult<()> {
        self.pause().await;
        let mut state = lock(&self.state);
        state.check_writable(&event.summary)?;
        let slot = state
            .calendar_events(calendar)?
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| SheetCalError::Store(format!("no event '{}'", event_id)))?;
        slot.event = event.clone();
        state.writes.updates += 1;
        Ok(())
    }

    async fn delete_event(&self, calendar: &CalendarRef, event_id: &str) -> SheetCalResult<()> {
        self.pause().await;
        let mut state = lock(&self.state);
        let summary = state
            .calendar_events(calendar)?
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.event.summary.clone())
            .ok_or_else(|| SheetCalError::Store(format!("no event '{}'", event_id)))?;
        state.check_writable(&summary)?;
        state.calendar_events(calendar)?.retain(|e| e.id != event_id);
        state.writes.deletes += 1;
        Ok(())
    }
}

/// Tables held in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: Mutex<Vec<(TableRef, Vec<Vec<String>>)>>,
    unavailable: Mutex<HashSet<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table.
    pub fn set_table<R, C>(&self, name: &str, rows: R)
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let mut tables = lock(&self.tables);
        match tables.iter_mut().find(|(t, _)| t.name == name) {
            Some((_, existing)) => *existing = rows,
            None => tables.push((TableRef::named(name), rows)),
        }
    }

    /// Make reads of this table fail.
    pub fn set_unavailable(&self, name: &str) {
        lock(&self.unavailable).insert(name.to_string());
    }
}

impl TableSource for MemorySource {
    async fn list_tables(&self) -> SheetCalResult<Vec<TableRef>> {
        Ok(lock(&self.tables).iter().map(|(t, _)| t.clone()).collect())
    }

    async fn get_rows(&self, table: &TableRef) -> SheetCalResult<Vec<Vec<String>>> {
        if lock(&self.unavailable).contains(&table.name) {
            return Err(SheetCalError::Source(format!(
                "table '{}' is unavailable",
                table.name
            )));
        }
        lock(&self.tables)
            .iter()
            .find(|(t, _)| t.id == table.id)
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| SheetCalError::Source(format!("no table '{}'", table.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDetails, EventTime};

    fn event(summary: &str) -> Event {
        Event {
            summary: summary.to_string(),
            location: String::new(),
            description: String::new(),
            start: EventTime::DateTime {
                date_time: "2025-03-04T16:00:00".into(),
                time_zone: None,
            },
            end: EventTime::DateTime {
                date_time: "2025-03-04T18:00:00".into(),
                time_zone: None,
            },
            details: EventDetails::default(),
        }
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let store = MemoryStore::new().with_offset_suffix("-08:00");
        let calendar = store
            .resolve_or_create_calendar("SLOHS Tennis")
            .await
            .expect("Should create calendar");
        let again = store.resolve_or_create_calendar("SLOHS Tennis").await.unwrap();
        assert_eq!(calendar, again);

        let id = store.insert_event(&calendar, &event("Match")).await.unwrap();
        let listed = store.list_events(&calendar).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].event.start.to_string(), "2025-03-04T16:00:00-08:00");

        store.delete_event(&calendar, &id).await.unwrap();
        assert!(store.events("SLOHS Tennis").is_empty());
        assert_eq!(store.writes().total(), 2);
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = MemoryStore::new();
        let calendar = store.resolve_or_create_calendar("Golf").await.unwrap();
        store.fail_writes_for("Match");
        assert!(store.insert_event(&calendar, &event("Match")).await.is_err());
        assert_eq!(store.writes().total(), 0);
    }

    #[tokio::test]
    async fn test_source_tables() {
        let source = MemorySource::new();
        source.set_table("Tennis", vec![vec!["Date", "Event"]]);
        source.set_table("Golf", Vec::<Vec<String>>::new());
        source.set_unavailable("Golf");

        let tables = source.list_tables().await.unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(source.get_rows(&tables[0]).await.unwrap()[0][1], "Event");
        assert!(source.get_rows(&tables[1]).await.is_err());
    }
}
