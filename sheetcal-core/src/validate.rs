//! Last check before an event is sent to a calendar store.

use chrono::Duration;

use crate::error::ValidationError;
use crate::event::{Event, EventTime};

/// Check that start/end are well-formed, of the same kind, and that end is
/// strictly after start.
pub fn validate(event: &Event) -> Result<(), ValidationError> {
    match (&event.start, &event.end) {
        (EventTime::Date { date: start }, EventTime::Date { date: end }) => {
            if end <= start {
                return Err(ValidationError::EndNotAfterStart {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
            Ok(())
        }
        (EventTime::DateTime { .. }, EventTime::DateTime { .. }) => {
            let start = event
                .start
                .naive_datetime()
                .ok_or_else(|| malformed("start", &event.start))?;
            let end = event
                .end
                .naive_datetime()
                .ok_or_else(|| malformed("end", &event.end))?;
            if end <= start {
                return Err(ValidationError::EndNotAfterStart {
                    start: event.start.to_string(),
                    end: event.end.to_string(),
                });
            }
            Ok(())
        }
        _ => Err(ValidationError::MixedKinds),
    }
}

fn malformed(field: &'static str, value: &EventTime) -> ValidationError {
    ValidationError::Malformed {
        field,
        value: value.to_string(),
    }
}

/// Repair an event whose end is not after its start.
///
/// Reversed values are swapped; equal values are widened by one day for
/// all-day events or by `timed_duration` for timed ones. Malformed or mixed
/// values are left untouched.
pub fn fix(mut event: Event, timed_duration: Duration) -> Event {
    match (&event.start, &event.end) {
        (EventTime::Date { date: start }, EventTime::Date { date: end }) => {
            let (start, end) = (*start, *end);
            if end < start {
                std::mem::swap(&mut event.start, &mut event.end);
            } else if end == start {
                event.end = EventTime::all_day(start + Duration::days(1));
            }
        }
        (EventTime::DateTime { time_zone, .. }, EventTime::DateTime { .. }) => {
            let time_zone = time_zone.clone();
            if let (Some(start), Some(end)) = (event.start.naive_datetime(), event.end.naive_datetime()) {
                if end < start {
                    std::mem::swap(&mut event.start, &mut event.end);
                } else if end == start {
                    event.end = EventTime::DateTime {
                        date_time: (start + timed_duration)
                            .format("%Y-%m-%dT%H:%M:%S")
                            .to_string(),
                        time_zone,
                    };
                }
            }
        }
        _ => {}
    }
    event
}

/// Validate, attempting one repair before giving up.
pub fn validate_or_fix(event: Event, timed_duration: Duration) -> Result<Event, ValidationError> {
    match validate(&event) {
        Ok(()) => Ok(event),
        Err(err) => {
            tracing::debug!(event = %event, "{}, attempting repair", err);
            let fixed = fix(event, timed_duration);
            validate(&fixed)?;
            Ok(fixed)
        }
    }
}

/// Run [`validate_or_fix`] over a batch, dropping events that stay invalid.
///
/// Returns the surviving events and how many were dropped. Each dropped
/// event is logged with its full payload.
pub fn validate_all(events: Vec<Event>, timed_duration: Duration) -> (Vec<Event>, usize) {
    let mut valid = Vec::with_capacity(events.len());
    let mut skipped = 0;
    for event in events {
        let payload = format!("{:?}", event);
        match validate_or_fix(event, timed_duration) {
            Ok(event) => valid.push(event),
            Err(err) => {
                tracing::warn!(event = %payload, "skipping invalid event: {}", err);
                skipped += 1;
            }
        }
    }
    (valid, skipped)
}
