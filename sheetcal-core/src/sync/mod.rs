//! Table-by-table sync passes.

mod report;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

use serde::Serialize;
use tokio::task::JoinSet;

pub use report::{SyncReport, TableMessage, Totals};

use crate::builder::{BuildOptions, EventBuilder, RowError};
use crate::diff::{CalendarDiff, ReconcileOutcome, reconcile_with};
use crate::source::{TableRef, TableSource};
use crate::store::CalendarStore;

/// Whether a pass writes to the calendar or only previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Apply,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub build: BuildOptions,
    pub calendar_prefix: Option<String>,
    /// Upper bound for one table's pass in [`sync_all`].
    pub table_timeout: StdDuration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            build: BuildOptions::default(),
            calendar_prefix: None,
            table_timeout: StdDuration::from_secs(120),
        }
    }
}

impl SyncSettings {
    pub fn calendar_name(&self, category: &str) -> String {
        match self.calendar_prefix.as_deref().map(str::trim) {
            Some(prefix) if !prefix.is_empty() => format!("{} {}", prefix, category),
            _ => category.to_string(),
        }
    }
}

/// How a table's pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum TableStatus {
    /// Reconciled (or previewed); individual store failures may still be
    /// listed in the outcome.
    Synced,
    /// Rows could not be fetched. The calendar was not touched.
    SourceUnavailable(String),
    /// No usable header row. The calendar was not touched.
    Unusable(String),
    /// The calendar could not be resolved or listed, the pass timed out, or
    /// it crashed.
    Failed(String),
}

impl TableStatus {
    pub fn error(&self) -> Option<&str> {
        match self {
            TableStatus::Synced => None,
            TableStatus::SourceUnavailable(e) | TableStatus::Unusable(e) | TableStatus::Failed(e) => {
                Some(e.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
    pub status: TableStatus,
    pub outcome: ReconcileOutcome,
    pub row_errors: Vec<RowError>,
}

impl TableReport {
    fn new(table: &str, status: TableStatus) -> Self {
        TableReport {
            table: table.to_string(),
            calendar: None,
            status,
            outcome: ReconcileOutcome::default(),
            row_errors: Vec::new(),
        }
    }
}

/// Run one pass for one table.
///
/// Failing to read the table, or finding no usable header, ends the pass
/// before anything touches the calendar: an empty event list would
/// otherwise delete every event in it.
pub async fn sync_table<T, S>(
    source: &T,
    store: &S,
    table: &TableRef,
    settings: &SyncSettings,
    mode: SyncMode,
) -> TableReport
where
    T: TableSource,
    S: CalendarStore,
{
    let progress = Mutex::new(TableReport::new(&table.name, TableStatus::Synced));
    run_table(source, store, table, settings, mode, &progress).await;
    progress.into_inner().unwrap_or_else(PoisonError::into_inner)
}

fn update(progress: &Mutex<TableReport>, change: impl FnOnce(&mut TableReport)) {
    let mut report = progress.lock().unwrap_or_else(PoisonError::into_inner);
    change(&mut report);
}

/// Body of [`sync_table`]. Everything learned so far is kept in `progress`,
/// so a pass cut short by a timeout still reports the writes it made.
async fn run_table<T, S>(
    source: &T,
    store: &S,
    table: &TableRef,
    settings: &SyncSettings,
    mode: SyncMode,
    progress: &Mutex<TableReport>,
) where
    T: TableSource,
    S: CalendarStore,
{
    let rows = match source.get_rows(table).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!(table = %table.name, "could not read table: {}", err);
            update(progress, |r| r.status = TableStatus::SourceUnavailable(err.to_string()));
            return;
        }
    };

    let builder = EventBuilder::new(settings.build.clone());
    let built = match builder.build_events(&rows, &table.name) {
        Ok(built) => built,
        Err(err) => {
            tracing::error!(table = %table.name, "table skipped: {}", err);
            update(progress, |r| r.status = TableStatus::Unusable(err.to_string()));
            return;
        }
    };

    let calendar_name = settings.calendar_name(&built.category);
    update(progress, |r| {
        r.row_errors = built.row_errors;
        r.calendar = Some(calendar_name.clone());
    });

    let calendar = match store.resolve_or_create_calendar(&calendar_name).await {
        Ok(calendar) => calendar,
        Err(err) => {
            tracing::error!(table = %table.name, calendar = %calendar_name, "{}", err);
            update(progress, |r| r.status = TableStatus::Failed(err.to_string()));
            return;
        }
    };

    let duration = settings.build.event_duration;
    let result = match mode {
        SyncMode::DryRun => CalendarDiff::fetch(store, &calendar, built.events, duration)
            .await
            .map(|diff| diff.preview()),
        SyncMode::Apply => {
            reconcile_with(store, &calendar, built.events, duration, |outcome| {
                update(progress, |r| r.outcome = outcome.clone())
            })
            .await
        }
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(table = %table.name, calendar = %calendar.name, "could not list events: {}", err);
            update(progress, |r| r.status = TableStatus::Failed(err.to_string()));
            return;
        }
    };

    tracing::info!(
        table = %table.name,
        calendar = %calendar.name,
        inserted = outcome.inserted,
        updated = outcome.updated,
        deleted = outcome.deleted,
        unchanged = outcome.unchanged,
        skipped = outcome.skipped,
        failed = outcome.failures.len(),
        "table synced"
    );
    update(progress, |r| r.outcome = outcome);
}

/// Tables to process: the allow-list if given, else whatever the source lists.
pub async fn resolve_tables<T: TableSource>(
    source: &T,
    only: &[String],
) -> crate::error::SheetCalResult<Vec<TableRef>> {
    if only.is_empty() {
        return source.list_tables().await;
    }

    let listed = match source.list_tables().await {
        Ok(listed) => listed,
        Err(err) => {
            tracing::warn!("could not list tables, using names as ids: {}", err);
            Vec::new()
        }
    };

    Ok(only
        .iter()
        .map(|name| {
            listed
                .iter()
                .find(|t| t.name == *name)
                .cloned()
                .unwrap_or_else(|| TableRef::named(name.as_str()))
        })
        .collect())
}

/// Sync every table concurrently, one task per table.
///
/// Each pass is bounded by `settings.table_timeout`; a timeout or a
/// panicking task becomes that table's `Failed` status. Reports come back
/// in table order.
pub async fn sync_all<T, S>(
    source: Arc<T>,
    store: Arc<S>,
    tables: Vec<TableRef>,
    settings: Arc<SyncSettings>,
    mode: SyncMode,
) -> SyncReport
where
    T: TableSource + 'static,
    S: CalendarStore + 'static,
{
    let mut set = JoinSet::new();
    let mut task_tables = HashMap::new();

    for (idx, table) in tables.iter().enumerate() {
        let source = Arc::clone(&source);
        let store = Arc::clone(&store);
        let settings = Arc::clone(&settings);
        let table = table.clone();

        let handle = set.spawn(async move {
            let limit = settings.table_timeout;
            let progress = Mutex::new(TableReport::new(&table.name, TableStatus::Synced));
            let finished = tokio::time::timeout(
                limit,
                run_table(source.as_ref(), store.as_ref(), &table, &settings, mode, &progress),
            )
            .await;

            let mut report = progress.into_inner().unwrap_or_else(PoisonError::into_inner);
            if finished.is_err() {
                tracing::error!(
                    table = %table.name,
                    applied = report.outcome.changes(),
                    "timed out after {:?}",
                    limit
                );
                report.status = TableStatus::Failed(format!("timed out after {:?}", limit));
            }
            (idx, report)
        });
        task_tables.insert(handle.id(), idx);
    }

    let mut reports: Vec<Option<TableReport>> = vec![None; tables.len()];

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, report)) => reports[idx] = Some(report),
            Err(err) => {
                if let Some(&idx) = task_tables.get(&err.id()) {
                    tracing::error!(table = %tables[idx].name, "sync task failed: {}", err);
                    reports[idx] = Some(TableReport::new(
                        &tables[idx].name,
                        TableStatus::Failed(format!("sync task failed: {}", err)),
                    ));
                }
            }
        }
    }

    SyncReport {
        tables: reports
            .into_iter()
            .zip(&tables)
            .map(|(report, table)| {
                report.unwrap_or_else(|| {
                    TableReport::new(&table.name, TableStatus::Failed("no result".into()))
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_name() {
        let mut settings = SyncSettings::default();
        assert_eq!(settings.calendar_name("Tennis"), "Tennis");
        settings.calendar_prefix = Some("SLOHS".into());
        assert_eq!(settings.calendar_name("Tennis"), "SLOHS Tennis");
        settings.calendar_prefix = Some("  ".into());
        assert_eq!(settings.calendar_name("Tennis"), "Tennis");
    }

    #[test]
    fn test_table_status_serializes_with_error() {
        let json = serde_json::to_value(TableStatus::Unusable("missing required columns: date".into()))
            .unwrap();
        assert_eq!(json["status"], "unusable");
        assert_eq!(json["error"], "missing required columns: date");
        assert_eq!(TableStatus::Synced.error(), None);
    }
}
