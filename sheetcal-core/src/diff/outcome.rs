use std::fmt;

use serde::Serialize;

use crate::diff::DiffKind;

/// One change that was (or, for a preview, would be) made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    pub kind: DiffKind,
    pub summary: String,
}

impl fmt::Display for AppliedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.summary)
    }
}

/// What applying a [`CalendarDiff`](crate::diff::CalendarDiff) did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Events already up to date.
    pub unchanged: usize,
    /// Built events that failed validation even after one repair.
    pub skipped: usize,
    /// Store operations that failed; the rest of the batch still ran.
    pub failures: Vec<String>,
    pub details: Vec<AppliedChange>,
}

impl ReconcileOutcome {
    pub fn record(&mut self, kind: DiffKind, summary: &str) {
        match kind {
            DiffKind::Create => self.inserted += 1,
            DiffKind::Update => self.updated += 1,
            DiffKind::Delete => self.deleted += 1,
        }
        self.details.push(AppliedChange {
            kind,
            summary: summary.to_string(),
        });
    }

    pub fn changes(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
