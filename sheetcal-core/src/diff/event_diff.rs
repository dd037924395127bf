use std::fmt;

use serde::Serialize;

use crate::diff::DiffKind;
use crate::event::Event;
use crate::identity::events_equal;
use crate::store::RemoteEvent;

/// A single pending change. `old` is the event as the store has it, `new`
/// the event as built from the table.
#[derive(Debug, Clone, Serialize)]
pub struct EventDiff {
    pub kind: DiffKind,
    pub old: Option<RemoteEvent>,
    pub new: Option<Event>,
}

impl fmt::Display for EventDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.summary())
    }
}

impl EventDiff {
    /// Diff between a remote and a built event; `None` when nothing changes.
    pub fn get_diff(old: Option<RemoteEvent>, new: Option<Event>) -> Option<EventDiff> {
        let kind = match (&old, &new) {
            (None, Some(_)) => DiffKind::Create,
            (Some(_), None) => DiffKind::Delete,
            (Some(remote), Some(built)) => {
                if events_equal(built, &remote.event) {
                    return None;
                }
                DiffKind::Update
            }
            (None, None) => return None,
        };
        Some(EventDiff { kind, old, new })
    }

    /// Summary of the event (prefer new, fallback to old)
    pub fn summary(&self) -> &str {
        self.new
            .as_ref()
            .or(self.old.as_ref().map(|r| &r.event))
            .map(|e| e.summary.trim())
            .unwrap_or_default()
    }
}
