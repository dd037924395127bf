//! Aggregated results of a multi-table sync.

use serde::Serialize;

use crate::sync::TableReport;

/// A message tied to the table it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableMessage {
    pub table: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    /// Built events rejected by validation.
    pub skipped: usize,
    /// Store operations that failed.
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub tables: Vec<TableReport>,
}

impl SyncReport {
    pub fn totals(&self) -> Totals {
        self.tables.iter().fold(Totals::default(), |mut t, r| {
            t.inserted += r.outcome.inserted;
            t.updated += r.outcome.updated;
            t.deleted += r.outcome.deleted;
            t.unchanged += r.outcome.unchanged;
            t.skipped += r.outcome.skipped;
            t.failed += r.outcome.failures.len();
            t
        })
    }

    /// Row-level parse errors, e.g. an ambiguous date.
    pub fn row_errors(&self) -> Vec<TableMessage> {
        self.tables
            .iter()
            .flat_map(|r| {
                r.row_errors.iter().map(|e| TableMessage {
                    table: r.table.clone(),
                    message: e.message.clone(),
                })
            })
            .collect()
    }

    /// Tables that could not be synced at all, plus failed store operations.
    pub fn table_errors(&self) -> Vec<TableMessage> {
        self.tables
            .iter()
            .flat_map(|r| {
                r.status
                    .error()
                    .map(str::to_string)
                    .into_iter()
                    .chain(r.outcome.failures.iter().cloned())
                    .map(|message| TableMessage {
                        table: r.table.clone(),
                        message,
                    })
            })
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.tables.iter().any(|r| r.outcome.changes() > 0)
    }

    pub fn has_errors(&self) -> bool {
        self.tables.iter().any(|r| {
            r.status.error().is_some() || r.outcome.has_failures() || !r.row_errors.is_empty()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RowError;
    use crate::diff::ReconcileOutcome;
    use crate::sync::TableStatus;

    fn report(table: &str, status: TableStatus, inserted: usize) -> TableReport {
        TableReport {
            table: table.to_string(),
            calendar: None,
            status,
            outcome: ReconcileOutcome {
                inserted,
                ..ReconcileOutcome::default()
            },
            row_errors: Vec::new(),
        }
    }

    #[test]
    fn test_totals_and_errors() {
        let mut tennis = report("Tennis", TableStatus::Synced, 2);
        tennis.row_errors.push(RowError {
            row: 6,
            message: "row 6: ambiguous date 'Week of 3/20'".into(),
        });
        tennis.outcome.failures.push("+ Match: rejected".into());
        let golf = report("Golf", TableStatus::SourceUnavailable("403".into()), 0);

        let sync = SyncReport {
            tables: vec![tennis, golf, report("Swim", TableStatus::Synced, 1)],
        };

        assert_eq!(sync.totals().inserted, 3);
        assert_eq!(sync.totals().failed, 1);
        assert_eq!(
            sync.row_errors(),
            vec![TableMessage {
                table: "Tennis".into(),
                message: "row 6: ambiguous date 'Week of 3/20'".into(),
            }]
        );
        let table_errors = sync.table_errors();
        assert_eq!(table_errors.len(), 2);
        assert_eq!(table_errors[1].table, "Golf");
        assert!(sync.has_changes());
        assert!(sync.has_errors());
    }

    #[test]
    fn test_empty_report() {
        let sync = SyncReport::default();
        assert!(!sync.has_changes());
        assert!(!sync.has_errors());
        assert_eq!(sync.totals(), Totals::default());
    }
}
