//! Turning table rows into calendar events.

mod columns;

use chrono::{Duration, NaiveTime};
use serde::Serialize;

pub use columns::{ColumnMap, RequiredColumns, Role, classify, find_header, looks_like_header};

use crate::error::ParseError;
use crate::event::{Event, EventDetails, EventTime};
use crate::parse::{DateParser, ParseOptions, parse_time};

pub const DEFAULT_TIME_ZONE: &str = "America/Los_Angeles";

const OPTIONAL_PLACEHOLDERS: &[&str] = &["-", "--"];

/// Settings for building events. Tests pin these explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub parse: ParseOptions,
    /// IANA zone attached to timed events.
    pub time_zone: String,
    /// Start time used when a time cell cannot be read.
    pub default_time: NaiveTime,
    /// Length of timed events.
    pub event_duration: Duration,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            parse: ParseOptions::default(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            default_time: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN),
            event_duration: Duration::hours(2),
        }
    }
}

/// A row that could not become an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// 1-based row number as a spreadsheet user would see it.
    pub row: usize,
    pub message: String,
}

/// Events built from one table.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTable {
    pub category: String,
    pub events: Vec<Event>,
    pub row_errors: Vec<RowError>,
}

pub struct EventBuilder {
    parser: DateParser,
    options: BuildOptions,
}

impl EventBuilder {
    pub fn new(options: BuildOptions) -> Self {
        EventBuilder {
            parser: DateParser::new(options.parse),
            options,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build events from the raw rows of a table.
    ///
    /// Fails only when no header row with date, event and location columns
    /// can be found. Individual bad rows are skipped; date failures are
    /// returned as row errors.
    pub fn build_events(
        &self,
        rows: &[Vec<String>],
        table_name: &str,
    ) -> Result<BuiltTable, ParseError> {
        let (header_idx, columns, required) = find_header(rows)?;
        let category = category(&rows[..header_idx], table_name);

        tracing::debug!(
            table = table_name,
            category = %category,
            header_row = header_idx + 1,
            "resolved columns"
        );

        let mut events = Vec::new();
        let mut row_errors = Vec::new();

        for (offset, row) in rows.iter().enumerate().skip(header_idx + 1) {
            let row_number = offset + 1;

            if row.len() <= required.max_index() {
                if row.iter().any(|c| !c.trim().is_empty()) {
                    tracing::debug!(table = table_name, row = row_number, "row too short, skipped");
                }
                continue;
            }

            let date_cell = row[required.date].trim();
            let activity = row[required.activity].trim();
            let location = row[required.location].trim();
            if date_cell.is_empty() || activity.is_empty() || location.is_empty() {
                tracing::debug!(table = table_name, row = row_number, "incomplete row, skipped");
                continue;
            }

            let span = match self.parser.parse(date_cell) {
                Ok(span) => span,
                Err(err) => {
                    tracing::warn!(table = table_name, row = row_number, "{}", err);
                    row_errors.push(RowError {
                        row: row_number,
                        message: format!("row {}: {}", row_number, err),
                    });
                    continue;
                }
            };

            let time_cell = cell(row, columns.time).unwrap_or_default();

            let (start, end) = if span.is_multi_day() {
                (
                    EventTime::all_day(span.start),
                    EventTime::all_day(span.exclusive_end()),
                )
            } else {
                match self.start_time(time_cell, table_name, row_number) {
                    Some(time) => {
                        let start = span.start.and_time(time);
                        let end = start + self.options.event_duration;
                        (
                            EventTime::timed(start, &self.options.time_zone),
                            EventTime::timed(end, &self.options.time_zone),
                        )
                    }
                    None => (
                        EventTime::all_day(span.start),
                        EventTime::all_day(span.exclusive_end()),
                    ),
                }
            };

            let details = EventDetails {
                transportation: optional(row, columns.transportation),
                release_time: optional(row, columns.release_time),
                departure_time: optional(row, columns.departure_time),
                attire: optional(row, columns.attire),
                notes: optional(row, columns.notes),
                bus: optional(row, columns.bus),
                vans: optional(row, columns.vans),
            };

            events.push(Event {
                summary: format!("{} - {} at {}", category, activity, location),
                location: location.to_string(),
                description: describe(location, time_cell, &details),
                start,
                end,
                details,
            });
        }

        Ok(BuiltTable {
            category,
            events,
            row_errors,
        })
    }

    /// Start time for a single-day row; `None` means all-day.
    fn start_time(&self, time_cell: &str, table: &str, row: usize) -> Option<NaiveTime> {
        match parse_time(time_cell) {
            Ok(time) => time,
            Err(err) => {
                tracing::warn!(
                    table,
                    row,
                    fallback = %self.options.default_time.format("%H:%M"),
                    "{}",
                    err
                );
                Some(self.options.default_time)
            }
        }
    }
}

/// Trimmed, non-empty cell at an optional column.
fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
}

/// Optional field value; placeholder dashes count as empty.
fn optional(row: &[String], idx: Option<usize>) -> Option<String> {
    cell(row, idx)
        .filter(|c| !OPTIONAL_PLACEHOLDERS.contains(c))
        .map(str::to_string)
}

/// Nearest non-empty first cell above the header, else the table name.
fn category(rows_above_header: &[Vec<String>], table_name: &str) -> String {
    rows_above_header
        .iter()
        .rev()
        .find_map(|row| row.iter().map(|c| c.trim()).find(|c| !c.is_empty()))
        .unwrap_or(table_name.trim())
        .to_string()
}

fn describe(location: &str, time_cell: &str, details: &EventDetails) -> String {
    let time = if time_cell.is_empty() { "TBD" } else { time_cell };
    let mut lines = vec![format!("Location: {}", location), format!("Time: {}", time)];
    lines.extend(
        details
            .labeled()
            .map(|(label, value)| format!("{}: {}", label, value)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn builder() -> EventBuilder {
        EventBuilder::new(BuildOptions {
            parse: ParseOptions::with_year(2025),
            ..BuildOptions::default()
        })
    }

    fn tennis_rows() -> Vec<Vec<String>> {
        vec![
            row(&["Boys Tennis"]),
            row(&["Date", "Event", "Location", "Time", "Bus", "Attire"]),
            row(&["3/4", "Match vs Righetti", "Arroyo Grande", "4", "1:45", "Whites"]),
            row(&["3/10-3/12", "Tournament", "Ojai", "", "", ""]),
            row(&["3/15", "Scrimmage", "Home Courts", "TBD"]),
            row(&["Week of 3/20", "Clinic", "SLO", ""]),
            row(&["", "", ""]),
            row(&["3/22", "Dual", "Templeton", "after lunch"]),
        ]
    }

    #[test]
    fn test_build_events_from_table() {
        let built = builder()
            .build_events(&tennis_rows(), "Tennis")
            .expect("Should build");

        assert_eq!(built.category, "Boys Tennis");
        assert_eq!(built.events.len(), 4);

        let match_day = &built.events[0];
        assert_eq!(match_day.summary, "Boys Tennis - Match vs Righetti at Arroyo Grande");
        assert_eq!(match_day.start.wall_clock(), Some("2025-03-04T16:00:00"));
        assert_eq!(match_day.end.wall_clock(), Some("2025-03-04T18:00:00"));
        assert_eq!(
            match_day.description,
            "Location: Arroyo Grande\nTime: 4\nAttire: Whites\nBus: 1:45"
        );
        assert_eq!(match_day.details.bus.as_deref(), Some("1:45"));
    }

    #[test]
    fn test_multi_day_is_all_day_with_exclusive_end() {
        let built = builder().build_events(&tennis_rows(), "Tennis").unwrap();
        let tournament = &built.events[1];
        assert_eq!(tournament.start, EventTime::all_day(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
        assert_eq!(tournament.end, EventTime::all_day(NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()));
        assert_eq!(tournament.description, "Location: Ojai\nTime: TBD");
    }

    #[test]
    fn test_placeholder_time_is_all_day() {
        let built = builder().build_events(&tennis_rows(), "Tennis").unwrap();
        let scrimmage = &built.events[2];
        assert!(scrimmage.start.is_all_day());
        assert_eq!(scrimmage.end, EventTime::all_day(NaiveDate::from_ymd_opt(2025, 3, 16).unwrap()));
    }

    #[test]
    fn test_unreadable_time_falls_back_to_default() {
        let built = builder().build_events(&tennis_rows(), "Tennis").unwrap();
        let dual = &built.events[3];
        assert_eq!(dual.start.wall_clock(), Some("2025-03-22T15:30:00"));
        assert_eq!(dual.end.wall_clock(), Some("2025-03-22T17:30:00"));
    }

    #[test]
    fn test_bad_dates_become_row_errors() {
        let built = builder().build_events(&tennis_rows(), "Tennis").unwrap();
        assert_eq!(built.row_errors.len(), 1);
        assert_eq!(built.row_errors[0].row, 6);
        assert!(built.row_errors[0].message.contains("ambiguous"));
    }

    #[test]
    fn test_placeholder_dashes_are_not_details() {
        let rows = vec![
            row(&["Date", "Event", "Location", "Time", "Transportation", "Notes"]),
            row(&["3/4", "Match", "Ojai", "4", "--", "-"]),
            row(&["3/5", "Match", "Ojai", "4", "Bus", "Bring lunch"]),
        ];
        let built = builder().build_events(&rows, "Tennis").unwrap();

        let dashes = &built.events[0];
        assert!(dashes.details.transportation.is_none());
        assert!(dashes.details.notes.is_none());
        assert_eq!(dashes.description, "Location: Ojai\nTime: 4");

        let filled = &built.events[1];
        assert_eq!(filled.details.transportation.as_deref(), Some("Bus"));
        assert_eq!(filled.details.notes.as_deref(), Some("Bring lunch"));
    }

    #[test]
    fn test_category_falls_back_to_table_name() {
        let rows = vec![
            row(&["Date", "Event", "Location"]),
            row(&["4/1", "Meet", "Mission Prep"]),
        ];
        let built = builder().build_events(&rows, " Swim ").unwrap();
        assert_eq!(built.category, "Swim");
        assert_eq!(built.events[0].summary, "Swim - Meet at Mission Prep");
        // no time column at all
        assert!(built.events[0].start.is_all_day());
    }

    #[test]
    fn test_unusable_table() {
        let rows = vec![row(&["Schedule coming soon"])];
        assert!(matches!(
            builder().build_events(&rows, "Golf"),
            Err(ParseError::MissingColumns(_))
        ));
        assert!(builder().build_events(&[], "Golf").is_err());
    }
}
