//! Error types for the sheetcal engine.

use thiserror::Error;

/// A malformed cell or table that prevents building an event.
///
/// Row-local: the offending row (or, for header problems, the whole table)
/// is skipped and the run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("ambiguous date '{0}'")]
    AmbiguousDate(String),

    #[error("unrecognized date '{0}'")]
    UnrecognizedDate(String),

    #[error("invalid calendar date in '{0}'")]
    InvalidDate(String),

    #[error("date range '{input}' spans {days} days (limit {limit})")]
    RangeTooLong { input: String, days: i64, limit: i64 },

    #[error("date range '{0}' ends before it starts")]
    ReversedRange(String),

    #[error("unrecognized time '{0}'")]
    UnrecognizedTime(String),

    #[error("missing required columns: {0}")]
    MissingColumns(String),
}

/// An event whose start/end cannot be sent to a calendar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed {field} '{value}'")]
    Malformed { field: &'static str, value: String },

    #[error("start and end mix all-day and timed values")]
    MixedKinds,

    #[error("end {end} is not after start {start}")]
    EndNotAfterStart { start: String, end: String },
}

/// Errors that can occur in sheetcal operations.
#[derive(Error, Debug)]
pub enum SheetCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid event: {0}")]
    Validation(#[from] ValidationError),

    #[error("Calendar store error: {0}")]
    Store(String),

    #[error("Table source error: {0}")]
    Source(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for sheetcal operations.
pub type SheetCalResult<T> = Result<T, SheetCalError>;
