//! Date and time cell parsing.
//!
//! Spreadsheet cells are typed by hand and vary wildly ("2/15-17/2025",
//! "8/4 - 8/7", "4:30 dive, 5:00 swim"). The parsers here turn them into
//! inclusive date spans and local times, or a [`ParseError`] the caller can
//! log against the row.

mod date;
mod time;

use chrono::{Datelike, Duration, Local, NaiveDate};

pub use date::DateParser;
pub use time::parse_time;

use crate::error::ParseError;

/// Inclusive span of dates parsed from a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    /// Last day of the span (inclusive). `None` for single-day input.
    pub end: Option<NaiveDate>,
}

impl DateSpan {
    pub fn single(start: NaiveDate) -> Self {
        DateSpan { start, end: None }
    }

    /// True when the span covers more than one calendar day.
    pub fn is_multi_day(&self) -> bool {
        self.end.is_some_and(|end| end > self.start)
    }

    /// Exclusive end date in calendar convention (last day + 1).
    pub fn exclusive_end(&self) -> NaiveDate {
        self.end.unwrap_or(self.start) + Duration::days(1)
    }
}

/// Knobs for date parsing. Tests pin these explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Year used when a cell carries none; also anchors the century of
    /// two-digit years.
    pub default_year: i32,
    /// Longest accepted range, counted in inclusive days.
    pub max_range_days: i64,
}

pub const DEFAULT_MAX_RANGE_DAYS: i64 = 7;

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            default_year: Local::now().year(),
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

impl ParseOptions {
    pub fn with_year(default_year: i32) -> Self {
        ParseOptions {
            default_year,
            ..Self::default()
        }
    }
}

/// Convenience wrapper: parse a date cell with the given options.
pub fn parse_date(cell: &str, options: ParseOptions) -> Result<DateSpan, ParseError> {
    DateParser::new(options).parse(cell)
}
