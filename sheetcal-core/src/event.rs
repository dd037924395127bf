//! Provider-neutral event types.
//!
//! Events are rebuilt from table rows on every pass and compared against what
//! the calendar store returns. The wire shape mirrors the common calendar API
//! convention: `{"date": "YYYY-MM-DD"}` for all-day values and
//! `{"dateTime": "...", "timeZone": "..."}` for timed ones.

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Trailing UTC designator or numeric offset of an RFC 3339 timestamp.
static OFFSET_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Z|[+-]\d{2}:\d{2})$").expect("valid offset regex"));

/// Strip a trailing `Z` or `[+-]HH:MM` from a timestamp, leaving the wall-clock part.
pub fn strip_utc_offset(timestamp: &str) -> &str {
    let trimmed = timestamp.trim();
    match OFFSET_SUFFIX.find(trimmed) {
        // Only strip when something timestamp-like precedes the suffix
        Some(m) if m.start() >= 10 => &trimmed[..m.start()],
        _ => trimmed,
    }
}

/// Start or end of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    /// Timed value. `date_time` is kept verbatim as the store returned it
    /// (with or without a UTC offset).
    #[serde(rename_all = "camelCase")]
    DateTime {
        date_time: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
    /// All-day value. End dates are exclusive.
    Date { date: NaiveDate },
}

impl EventTime {
    pub fn all_day(date: NaiveDate) -> Self {
        EventTime::Date { date }
    }

    pub fn timed(datetime: NaiveDateTime, time_zone: &str) -> Self {
        EventTime::DateTime {
            date_time: datetime.format(DATE_TIME_FORMAT).to_string(),
            time_zone: Some(time_zone.to_string()),
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date { .. })
    }

    /// Timestamp with any UTC offset removed. `None` for all-day values.
    pub fn wall_clock(&self) -> Option<&str> {
        match self {
            EventTime::DateTime { date_time, .. } => Some(strip_utc_offset(date_time)),
            EventTime::Date { .. } => None,
        }
    }

    /// Representation used in canonical keys: the date for all-day values,
    /// the wall-clock timestamp for timed ones.
    pub fn key_repr(&self) -> String {
        match self {
            EventTime::Date { date } => date.format(DATE_FORMAT).to_string(),
            EventTime::DateTime { date_time, .. } => strip_utc_offset(date_time).to_string(),
        }
    }

    /// Calendar date of this value (the date portion of a timestamp).
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        match self {
            EventTime::Date { date } => Some(*date),
            EventTime::DateTime { date_time, .. } => date_time
                .trim()
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok()),
        }
    }

    /// Parsed wall-clock timestamp, if the value is timed and well-formed.
    pub fn naive_datetime(&self) -> Option<NaiveDateTime> {
        let wall = self.wall_clock()?;
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(wall, fmt).ok())
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date { date } => write!(f, "{}", date.format(DATE_FORMAT)),
            EventTime::DateTime { date_time, .. } => write!(f, "{}", date_time),
        }
    }
}

/// Optional logistics fields carried over from extra table columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vans: Option<String>,
}

impl EventDetails {
    pub fn is_empty(&self) -> bool {
        self.labeled().next().is_none()
    }

    /// Present fields with their description labels, in description order.
    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Transportation", &self.transportation),
            ("Release Time", &self.release_time),
            ("Departure Time", &self.departure_time),
            ("Attire", &self.attire),
            ("Notes", &self.notes),
            ("Bus", &self.bus),
            ("Vans", &self.vans),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
    }
}

/// A calendar event (provider-neutral)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub location: String,
    /// Missing descriptions deserialize as empty.
    #[serde(default)]
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(flatten)]
    pub details: EventDetails,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_utc_offset() {
        assert_eq!(strip_utc_offset("2025-09-06T15:00:00-07:00"), "2025-09-06T15:00:00");
        assert_eq!(strip_utc_offset("2025-09-06T15:00:00+05:30"), "2025-09-06T15:00:00");
        assert_eq!(strip_utc_offset("2025-09-07T06:00:00Z"), "2025-09-07T06:00:00");
        assert_eq!(strip_utc_offset("2025-09-06T15:00:00"), "2025-09-06T15:00:00");
    }

    #[test]
    fn test_event_time_wire_shape() {
        let json = r#"{"dateTime":"2025-03-04T16:00:00-08:00","timeZone":"America/Los_Angeles"}"#;
        let time: EventTime = serde_json::from_str(json).expect("Should parse timed value");
        assert_eq!(time.wall_clock(), Some("2025-03-04T16:00:00"));

        let time: EventTime =
            serde_json::from_str(r#"{"date":"2025-03-04"}"#).expect("Should parse all-day value");
        assert!(time.is_all_day());
        assert_eq!(serde_json::to_string(&time).unwrap(), r#"{"date":"2025-03-04"}"#);
    }

    #[test]
    fn test_calendar_date_of_timestamp() {
        let time = EventTime::DateTime {
            date_time: "2025-03-04T16:00:00Z".into(),
            time_zone: None,
        };
        assert_eq!(time.calendar_date(), NaiveDate::from_ymd_opt(2025, 3, 4));
        assert!(time.naive_datetime().is_some());
    }

    #[test]
    fn test_event_without_description_deserializes() {
        let json = r#"{
            "summary": "Tennis - Match at Arroyo Grande",
            "start": {"date": "2025-03-04"},
            "end": {"date": "2025-03-05"},
            "bus": "1:45"
        }"#;
        let event: Event = serde_json::from_str(json).expect("Should parse event");
        assert_eq!(event.description, "");
        assert_eq!(event.details.bus.as_deref(), Some("1:45"));
        assert_eq!(event.details.labeled().collect::<Vec<_>>(), vec![("Bus", "1:45")]);
    }
}
