//! Colored terminal rendering for sheetcal-core types.

use owo_colors::OwoColorize;
use sheetcal_core::diff::AppliedChange;
use sheetcal_core::sync::Totals;
use sheetcal_core::{DiffKind, Event, RowError, TableReport, TableStatus};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.to_string();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for AppliedChange {
    fn render(&self) -> String {
        format!("{} {}", self.kind.render(), colorize_diff(self.kind, &self.summary))
    }
}

impl Render for RowError {
    fn render(&self) -> String {
        format!("{} {}", "!".yellow(), self.message.yellow())
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let when = if self.start.is_all_day() {
            format!("{} (all day, until {})", self.start, self.end)
        } else {
            format!("{} → {}", self.start, self.end)
        };
        format!("{}  {}", self.summary, when.dimmed())
    }
}

/// Show counts instead of individual changes above this many
const COMPACT_THRESHOLD: usize = 5;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

fn render_changes(changes: &[AppliedChange], verbose: bool, lines: &mut Vec<String>) {
    if verbose || changes.len() <= COMPACT_THRESHOLD {
        lines.extend(changes.iter().map(|c| format!("   {}", c.render())));
        return;
    }

    for (kind, label) in [
        (DiffKind::Create, "new"),
        (DiffKind::Update, "changed"),
        (DiffKind::Delete, "deleted"),
    ] {
        let count = changes.iter().filter(|c| c.kind == kind).count();
        if count > 0 {
            let text = format!("({} {} {})", count, label, pluralize("event", count));
            lines.push(format!("   {} {}", kind.render(), colorize_diff(kind, &text)));
        }
    }
}

pub trait TableReportRender {
    fn render(&self, verbose: bool) -> String;
}

impl TableReportRender for TableReport {
    fn render(&self, verbose: bool) -> String {
        let title = match &self.calendar {
            Some(calendar) => format!("📅 {} {}", calendar, format!("({})", self.table).dimmed()),
            None => format!("📅 {}", self.table),
        };
        let mut lines = vec![title];

        match &self.status {
            TableStatus::Synced => {}
            TableStatus::SourceUnavailable(e) => {
                lines.push(format!("   {} {}", "Could not read table:".red(), e.red()));
            }
            TableStatus::Unusable(e) => {
                lines.push(format!("   {} {}", "Table skipped:".red(), e.red()));
            }
            TableStatus::Failed(e) => lines.push(format!("   {}", e.red())),
        }

        if self.status == TableStatus::Synced && self.outcome.details.is_empty() {
            lines.push("   No changes".dimmed().to_string());
        }
        render_changes(&self.outcome.details, verbose, &mut lines);

        lines.extend(self.outcome.failures.iter().map(|f| format!("   {}", f.red())));
        lines.extend(self.row_errors.iter().map(|e| format!("   {}", e.render())));
        let skipped = self.outcome.skipped;
        if skipped > 0 {
            lines.push(format!(
                "   {}",
                format!("{} invalid {} skipped", skipped, pluralize("event", skipped)).yellow()
            ));
        }

        lines.join("\n")
    }
}

pub fn render_totals(totals: &Totals, verb: &str) -> String {
    let mut line = format!(
        "{}: {} created, {} updated, {} deleted",
        verb, totals.inserted, totals.updated, totals.deleted
    );
    if totals.failed > 0 {
        line.push_str(&format!(", {}", format!("{} failed", totals.failed).red()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcal_core::ReconcileOutcome;

    fn report(creates: usize) -> TableReport {
        let mut outcome = ReconcileOutcome::default();
        for i in 0..creates {
            outcome.record(DiffKind::Create, &format!("Tennis - Match {i} at Ojai"));
        }
        TableReport {
            table: "Tennis".into(),
            calendar: Some("SLOHS Tennis".into()),
            status: TableStatus::Synced,
            outcome,
            row_errors: Vec::new(),
        }
    }

    #[test]
    fn test_few_changes_are_listed() {
        let rendered = report(2).render(false);
        assert!(rendered.contains("Tennis - Match 1 at Ojai"));
        assert!(!rendered.contains("No changes"));
    }

    #[test]
    fn test_many_changes_are_compacted_unless_verbose() {
        let compact = report(COMPACT_THRESHOLD + 1).render(false);
        assert!(compact.contains("(6 new events)"));
        assert!(!compact.contains("Match 0"));

        let verbose = report(COMPACT_THRESHOLD + 1).render(true);
        assert!(verbose.contains("Match 0"));
    }

    #[test]
    fn test_unchanged_table() {
        assert!(report(0).render(false).contains("No changes"));
    }

    #[test]
    fn test_totals_line() {
        let totals = Totals {
            inserted: 2,
            deleted: 1,
            ..Totals::default()
        };
        assert_eq!(
            render_totals(&totals, "Synced"),
            "Synced: 2 created, 0 updated, 1 deleted"
        );
    }
}
