//! Time cell parsing.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use crate::error::ParseError;

/// Cells that explicitly mean "no specific time".
const PLACEHOLDERS: &[&str] = &[
    "tbd",
    "tba",
    "all day",
    "all-day",
    "all slohs athletes",
    "qualifiers",
    "all athletes",
    "-",
    "--",
];

/// Words showing someone typed a venue into the time column.
const LOCATION_KEYWORDS: &[&str] = &[
    "ridge", "club", "cc", "gym", "field", "pool", "stadium", "court", "home", "away",
];

/// Trailing annotations cut from the first time ("4:30 dive", "5:00 JV only").
const ANNOTATIONS: &[&str] = &["(", "dive", "swim", "both", "only"];

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(am|pm|a|p)?$").expect("valid time pattern")
});

/// Parse a time cell into a local time of day.
///
/// Returns `Ok(None)` for cells that mean "all-day" (empty, placeholders,
/// or a location typed into the time column). Hours without a meridiem are
/// read as afternoon for 1..=11 and as noon for 12: school events rarely
/// start before noon unless someone writes "am".
pub fn parse_time(cell: &str) -> Result<Option<NaiveTime>, ParseError> {
    let lowered = cell.trim().to_lowercase();
    if lowered.is_empty() || PLACEHOLDERS.contains(&lowered.as_str()) {
        return Ok(None);
    }

    // substring match, so "Fieldhouse" counts as a venue
    if LOCATION_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return Ok(None);
    }

    let first = first_time(&lowered);
    if first == "noon" {
        return Ok(NaiveTime::from_hms_opt(12, 0, 0));
    }

    let caps = TIME_PATTERN
        .captures(&first)
        .ok_or_else(|| unrecognized(cell))?;

    let hour: u32 = caps[1].parse().map_err(|_| unrecognized(cell))?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| unrecognized(cell))?,
        None => 0,
    };
    let meridiem = caps.get(3).map(|m| m.as_str());

    let hour = resolve_hour(hour, meridiem).ok_or_else(|| unrecognized(cell))?;
    NaiveTime::from_hms_opt(hour, minute, 0)
        .map(Some)
        .ok_or_else(|| unrecognized(cell))
}

/// First of possibly several times, with annotations and dots stripped.
fn first_time(lowered: &str) -> String {
    let first = lowered.split([',', '/']).next().unwrap_or_default();

    let cut = ANNOTATIONS
        .iter()
        .filter_map(|a| first.find(*a))
        .min()
        .unwrap_or(first.len());

    first[..cut].replace('.', "").trim().to_string()
}

fn resolve_hour(hour: u32, meridiem: Option<&str>) -> Option<u32> {
    match meridiem {
        Some("am" | "a") => match hour {
            12 => Some(0),
            1..=11 => Some(hour),
            _ => None,
        },
        Some(_) => match hour {
            1..=11 => Some(hour + 12),
            12..=23 => Some(hour),
            _ => None,
        },
        None => match hour {
            1..=11 => Some(hour + 12),
            12 => Some(12),
            _ => None,
        },
    }
}

fn unrecognized(cell: &str) -> ParseError {
    ParseError::UnrecognizedTime(cell.trim().to_string())
}
