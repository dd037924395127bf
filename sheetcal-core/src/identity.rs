//! Event identity: the canonical key and semantic equality.
//!
//! The key decides *which* remote event a freshly built event corresponds
//! to; equality decides whether that remote event needs an update. Both
//! ignore the noise calendar stores introduce when they echo events back
//! (UTC offsets appended to timestamps, trailing whitespace).

use std::sync::LazyLock;

use regex::Regex;

use crate::event::{Event, EventTime};

/// ISO timestamps embedded in free text, with their offset captured separately.
static EMBEDDED_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?)(?:Z|[+-]\d{2}:\d{2})")
        .expect("valid timestamp regex")
});

/// `start_end_summary`, with offsets stripped from timed values.
///
/// This is not the raw timestamp text: `...T16:00:00-08:00` and
/// `...T16:00:00` share a key, so stores that echo offsets back still match.
///
/// All-day and timed values keep distinct representations, so an event that
/// flips between the two is treated as a different event (delete + insert).
pub fn canonical_key(event: &Event) -> String {
    format!(
        "{}_{}_{}",
        event.start.key_repr(),
        event.end.key_repr(),
        event.summary.trim()
    )
}

/// Semantic equality between a built event and a remote one.
pub fn events_equal(a: &Event, b: &Event) -> bool {
    a.summary.trim() == b.summary.trim()
        && times_equal(&a.start, &b.start)
        && times_equal(&a.end, &b.end)
        && normalize_description(&a.description) == normalize_description(&b.description)
}

fn times_equal(a: &EventTime, b: &EventTime) -> bool {
    match (a, b) {
        (EventTime::Date { date: x }, EventTime::Date { date: y }) => x == y,
        (EventTime::DateTime { .. }, EventTime::DateTime { .. }) => {
            match (a.naive_datetime(), b.naive_datetime()) {
                (Some(x), Some(y)) => x == y,
                _ => a.wall_clock() == b.wall_clock(),
            }
        }
        // mixed kinds: compare the date portion only
        _ => a.calendar_date() == b.calendar_date(),
    }
}

/// Trimmed description with offsets removed from embedded timestamps.
pub fn normalize_description(description: &str) -> String {
    EMBEDDED_OFFSET
        .replace_all(description.trim(), "$1")
        .into_owned()
}
