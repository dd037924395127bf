//! Calendar diff computation and application.

use std::collections::{HashMap, HashSet};

use chrono::Duration;

use crate::diff::{DiffKind, EventDiff, ReconcileOutcome};
use crate::error::{SheetCalError, SheetCalResult};
use crate::event::Event;
use crate::identity::canonical_key;
use crate::store::{CalendarRef, CalendarStore, RemoteEvent};
use crate::validate::validate_all;

/// The changes needed to make a calendar match a freshly built event list.
#[derive(Debug, Clone, Default)]
pub struct CalendarDiff {
    /// Sorted by [`DiffKind`]: deletes, then creates, then updates.
    pub diffs: Vec<EventDiff>,
    pub unchanged: usize,
    /// Events dropped by validation before diffing.
    pub skipped: usize,
}

impl CalendarDiff {
    /// Compare built events against a calendar snapshot. Pure.
    ///
    /// Events are paired by canonical key. When the table yields the same
    /// key twice the first row wins; when the calendar holds the same key
    /// twice the extra copies are deleted.
    pub fn compute(new_events: Vec<Event>, snapshot: Vec<RemoteEvent>) -> Self {
        let mut remote_by_key: HashMap<String, RemoteEvent> = HashMap::new();
        let mut remote_order = Vec::new();
        let mut diffs = Vec::new();

        for remote in snapshot {
            let key = canonical_key(&remote.event);
            if remote_by_key.contains_key(&key) {
                tracing::debug!(key = %key, id = %remote.id, "duplicate remote event");
                diffs.extend(EventDiff::get_diff(Some(remote), None));
                continue;
            }
            remote_order.push(key.clone());
            remote_by_key.insert(key, remote);
        }

        let mut seen = HashSet::new();
        let mut unchanged = 0;

        for event in new_events {
            let key = canonical_key(&event);
            if !seen.insert(key.clone()) {
                tracing::debug!(key = %key, "duplicate row, keeping the first");
                continue;
            }

            let remote = remote_by_key.remove(&key);
            let matched = remote.is_some();
            match EventDiff::get_diff(remote, Some(event)) {
                Some(diff) => diffs.push(diff),
                None if matched => unchanged += 1,
                None => {}
            }
        }

        // Whatever is left in the calendar no longer appears in the table
        for key in remote_order {
            if let Some(remote) = remote_by_key.remove(&key) {
                diffs.extend(EventDiff::get_diff(Some(remote), None));
            }
        }

        diffs.sort_by_key(|d| d.kind);

        CalendarDiff {
            diffs,
            unchanged,
            skipped: 0,
        }
    }

    /// Validate `events`, then diff them against the calendar's current
    /// events.
    pub async fn fetch<S: CalendarStore>(
        store: &S,
        calendar: &CalendarRef,
        events: Vec<Event>,
        timed_duration: Duration,
    ) -> SheetCalResult<Self> {
        let (events, skipped) = validate_all(events, timed_duration);
        let snapshot = store.list_events(calendar).await?;
        Ok(CalendarDiff {
            skipped,
            ..CalendarDiff::compute(events, snapshot)
        })
    }

    fn empty_outcome(&self) -> ReconcileOutcome {
        ReconcileOutcome {
            unchanged: self.unchanged,
            skipped: self.skipped,
            ..ReconcileOutcome::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn count(&self, kind: DiffKind) -> usize {
        self.diffs.iter().filter(|d| d.kind == kind).count()
    }

    /// Outcome as if every change had succeeded, without touching a store.
    pub fn preview(&self) -> ReconcileOutcome {
        let mut outcome = self.empty_outcome();
        for diff in &self.diffs {
            outcome.record(diff.kind, diff.summary());
        }
        outcome
    }

    /// Apply the changes one at a time. A failed operation is logged and
    /// recorded; the rest of the batch still runs.
    pub async fn apply<S: CalendarStore>(
        &self,
        store: &S,
        calendar: &CalendarRef,
    ) -> ReconcileOutcome {
        self.apply_with(store, calendar, |_| {}).await
    }

    /// Like [`apply`](Self::apply), handing the running outcome to
    /// `progress` after every change so callers that may be cancelled
    /// still know what was written.
    pub async fn apply_with<S, F>(
        &self,
        store: &S,
        calendar: &CalendarRef,
        mut progress: F,
    ) -> ReconcileOutcome
    where
        S: CalendarStore,
        F: FnMut(&ReconcileOutcome),
    {
        let mut outcome = self.empty_outcome();
        progress(&outcome);

        for diff in &self.diffs {
            match apply_one(store, calendar, diff).await {
                Ok(()) => {
                    tracing::info!(calendar = %calendar.name, "{}", diff);
                    outcome.record(diff.kind, diff.summary());
                }
                Err(err) => {
                    tracing::warn!(calendar = %calendar.name, "{} failed: {}", diff, err);
                    outcome.failures.push(format!("{}: {}", diff, err));
                }
            }
            progress(&outcome);
        }

        outcome
    }
}

async fn apply_one<S: CalendarStore>(
    store: &S,
    calendar: &CalendarRef,
    diff: &EventDiff,
) -> SheetCalResult<()> {
    match (&diff.old, &diff.new) {
        (None, Some(event)) => store.insert_event(calendar, event).await.map(|_| ()),
        (Some(remote), Some(event)) => store.update_event(calendar, &remote.id, event).await,
        (Some(remote), None) => store.delete_event(calendar, &remote.id).await,
        (None, None) => Err(SheetCalError::Store("empty diff".to_string())),
    }
}

/// Validate `events`, fetch the calendar's events, diff and apply.
///
/// Running it twice with the same input performs no changes the second time.
pub async fn reconcile<S: CalendarStore>(
    store: &S,
    calendar: &CalendarRef,
    events: Vec<Event>,
    timed_duration: Duration,
) -> SheetCalResult<ReconcileOutcome> {
    reconcile_with(store, calendar, events, timed_duration, |_| {}).await
}

/// [`reconcile`] reporting the running outcome after every change.
pub async fn reconcile_with<S, F>(
    store: &S,
    calendar: &CalendarRef,
    events: Vec<Event>,
    timed_duration: Duration,
    progress: F,
) -> SheetCalResult<ReconcileOutcome>
where
    S: CalendarStore,
    F: FnMut(&ReconcileOutcome),
{
    let diff = CalendarDiff::fetch(store, calendar, events, timed_duration).await?;
    Ok(diff.apply_with(store, calendar, progress).await)
}
