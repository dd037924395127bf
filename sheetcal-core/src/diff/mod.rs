//! Reconciliation: computing and applying the changes that bring a calendar
//! in line with a table.

mod calendar_diff;
mod diff_kind;
mod event_diff;
mod outcome;

pub use calendar_diff::{CalendarDiff, reconcile, reconcile_with};
pub use diff_kind::DiffKind;
pub use event_diff::EventDiff;
pub use outcome::{AppliedChange, ReconcileOutcome};
