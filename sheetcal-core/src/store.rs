//! The calendar side of a sync.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::SheetCalResult;
use crate::event::Event;

/// A calendar resolved by display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarRef {
    pub id: String,
    pub name: String,
}

/// An event as stored remotely, with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    #[serde(flatten)]
    pub event: Event,
}

/// A calendar service (Google Calendar, a CalDAV server, a directory of
/// JSON files...). Implementations own authentication and transport.
pub trait CalendarStore: Send + Sync {
    /// Find the calendar with this display name, creating it if needed.
    fn resolve_or_create_calendar(
        &self,
        name: &str,
    ) -> impl Future<Output = SheetCalResult<CalendarRef>> + Send;

    /// Every event currently in the calendar.
    fn list_events(
        &self,
        calendar: &CalendarRef,
    ) -> impl Future<Output = SheetCalResult<Vec<RemoteEvent>>> + Send;

    /// Insert an event, returning the id the store assigned.
    fn insert_event(
        &self,
        calendar: &CalendarRef,
        event: &Event,
    ) -> impl Future<Output = SheetCalResult<String>> + Send;

    fn update_event(
        &self,
        calendar: &CalendarRef,
        event_id: &str,
        event: &Event,
    ) -> impl Future<Output = SheetCalResult<()>> + Send;

    fn delete_event(
        &self,
        calendar: &CalendarRef,
        event_id: &str,
    ) -> impl Future<Output = SheetCalResult<()>> + Send;
}
