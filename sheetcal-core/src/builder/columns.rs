//! Header detection and column-role assignment.

use crate::error::ParseError;

/// Cells that mark a row as a header row.
const HEADER_KEYWORDS: &[&str] = &["date", "event", "location", "time", "venue", "place"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Date,
    Release,
    Departure,
    Transportation,
    Attire,
    Notes,
    Bus,
    Vans,
    Time,
    Location,
    Activity,
}

fn is_date(h: &str) -> bool {
    h.contains("date")
}

fn is_release(h: &str) -> bool {
    h.contains("release")
}

fn is_departure(h: &str) -> bool {
    h.contains("depart")
}

fn is_transportation(h: &str) -> bool {
    h.contains("transport") || (h.contains("bus") && h.contains("van"))
}

fn is_attire(h: &str) -> bool {
    h.contains("attire") || h.contains("uniform")
}

fn is_notes(h: &str) -> bool {
    h.contains("note")
}

fn is_bus(h: &str) -> bool {
    h.contains("bus")
}

fn is_vans(h: &str) -> bool {
    h.contains("van")
}

fn is_time(h: &str) -> bool {
    h.contains("time")
}

fn is_location(h: &str) -> bool {
    h.contains("location") || h.contains("place") || h.contains("venue")
}

fn is_activity(h: &str) -> bool {
    ["event", "title", "name", "opponent"]
        .iter()
        .any(|k| h.contains(k))
}

/// Ordered predicates; a header takes the role of the first that matches.
/// Specific roles come first so "Departure Time" is not read as the time
/// column and "Bus/Vans" is not read as the bus column.
const ROLE_RULES: &[(Role, fn(&str) -> bool)] = &[
    (Role::Date, is_date),
    (Role::Release, is_release),
    (Role::Departure, is_departure),
    (Role::Transportation, is_transportation),
    (Role::Attire, is_attire),
    (Role::Notes, is_notes),
    (Role::Bus, is_bus),
    (Role::Vans, is_vans),
    (Role::Time, is_time),
    (Role::Location, is_location),
    (Role::Activity, is_activity),
];

pub fn classify(header: &str) -> Option<Role> {
    let header = header.trim().to_lowercase();
    if header.is_empty() {
        return None;
    }
    ROLE_RULES
        .iter()
        .find(|(_, matches)| matches(&header))
        .map(|(role, _)| *role)
}

/// Column index per role, as found in a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub activity: Option<usize>,
    pub location: Option<usize>,
    pub time: Option<usize>,
    pub transportation: Option<usize>,
    pub release_time: Option<usize>,
    pub departure_time: Option<usize>,
    pub attire: Option<usize>,
    pub notes: Option<usize>,
    pub bus: Option<usize>,
    pub vans: Option<usize>,
}

/// Columns every event row needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredColumns {
    pub date: usize,
    pub activity: usize,
    pub location: usize,
}

impl RequiredColumns {
    pub fn max_index(&self) -> usize {
        self.date.max(self.activity).max(self.location)
    }
}

impl ColumnMap {
    /// Assign roles to a header row. The first column matching a role keeps
    /// it, except that a time header mentioning "start" replaces an earlier
    /// plain time header.
    pub fn detect(header: &[String]) -> Self {
        let mut map = ColumnMap::default();
        let mut time_is_start = false;

        for (idx, cell) in header.iter().enumerate() {
            let Some(role) = classify(cell) else {
                continue;
            };

            if role == Role::Time {
                let is_start = cell.to_lowercase().contains("start");
                if map.time.is_none() || (is_start && !time_is_start) {
                    map.time = Some(idx);
                    time_is_start = is_start;
                }
                continue;
            }

            let slot = map.slot(role);
            if slot.is_none() {
                *slot = Some(idx);
            }
        }

        map
    }

    fn slot(&mut self, role: Role) -> &mut Option<usize> {
        match role {
            Role::Date => &mut self.date,
            Role::Release => &mut self.release_time,
            Role::Departure => &mut self.departure_time,
            Role::Transportation => &mut self.transportation,
            Role::Attire => &mut self.attire,
            Role::Notes => &mut self.notes,
            Role::Bus => &mut self.bus,
            Role::Vans => &mut self.vans,
            Role::Time => &mut self.time,
            Role::Location => &mut self.location,
            Role::Activity => &mut self.activity,
        }
    }

    pub fn required(&self) -> Result<RequiredColumns, ParseError> {
        match (self.date, self.activity, self.location) {
            (Some(date), Some(activity), Some(location)) => Ok(RequiredColumns {
                date,
                activity,
                location,
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("date", self.date),
                    ("event", self.activity),
                    ("location", self.location),
                ]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name)
                .collect();
                Err(ParseError::MissingColumns(missing.join(", ")))
            }
        }
    }
}

/// True when any cell of the row looks like a column header.
pub fn looks_like_header(row: &[String]) -> bool {
    row.iter().any(|cell| {
        let cell = cell.to_lowercase();
        HEADER_KEYWORDS.iter().any(|k| cell.contains(k))
    })
}

/// Locate the header row and its columns.
///
/// Every header-looking row is tried in order; the first whose columns
/// resolve wins. Title rows such as "Track & Field Events" look like headers
/// but lack the required columns, so they are passed over.
pub fn find_header(rows: &[Vec<String>]) -> Result<(usize, ColumnMap, RequiredColumns), ParseError> {
    let mut last_err = None;

    for (idx, row) in rows.iter().enumerate() {
        if !looks_like_header(row) {
            continue;
        }
        let map = ColumnMap::detect(row);
        match map.required() {
            Ok(required) => return Ok((idx, map, required)),
            Err(err) => last_err = Some(err),
        }
    }

    Err(last_err.unwrap_or_else(|| ParseError::MissingColumns("no header row".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(classify("Date"), Some(Role::Date));
        assert_eq!(classify("Departure Time"), Some(Role::Departure));
        assert_eq!(classify("Release Time"), Some(Role::Release));
        assert_eq!(classify("Bus/Vans"), Some(Role::Transportation));
        assert_eq!(classify("Bus"), Some(Role::Bus));
        assert_eq!(classify("Vans"), Some(Role::Vans));
        assert_eq!(classify("Start Time"), Some(Role::Time));
        assert_eq!(classify("Venue"), Some(Role::Location));
        assert_eq!(classify("Opponent"), Some(Role::Activity));
        assert_eq!(classify("Uniform"), Some(Role::Attire));
        assert_eq!(classify(""), None);
        assert_eq!(classify("Coach"), None);
    }

    #[test]
    fn test_detect_columns() {
        let map = ColumnMap::detect(&row(&[
            "Date", "Event", "Location", "Time", "Transportation", "Notes",
        ]));
        assert_eq!(map.date, Some(0));
        assert_eq!(map.activity, Some(1));
        assert_eq!(map.location, Some(2));
        assert_eq!(map.time, Some(3));
        assert_eq!(map.transportation, Some(4));
        assert_eq!(map.notes, Some(5));
        assert_eq!(map.bus, None);
    }

    #[test]
    fn test_start_time_overrides_plain_time() {
        let map = ColumnMap::detect(&row(&["Date", "Event", "Place", "Time Zone", "Start Time"]));
        assert_eq!(map.time, Some(4));

        let map = ColumnMap::detect(&row(&["Date", "Start Time", "End Time", "Event", "Place"]));
        assert_eq!(map.time, Some(1));
    }

    #[test]
    fn test_missing_required_columns() {
        let err = ColumnMap::detect(&row(&["Date", "Time"])).required().unwrap_err();
        assert_eq!(err, ParseError::MissingColumns("event, location".into()));
    }

    #[test]
    fn test_find_header_skips_title_rows() {
        let rows = vec![
            row(&["Track & Field Events"]),
            row(&[]),
            row(&["Date", "Meet", "Location", "Time"]),
            row(&["3/1", "Invitational", "Arroyo Grande", "3:00"]),
        ];
        // "Meet" is not an activity header, so nothing resolves
        assert!(find_header(&rows).is_err());

        let rows = vec![
            row(&["Track & Field Events"]),
            row(&["Date", "Event", "Location", "Time"]),
        ];
        let (idx, _, required) = find_header(&rows).expect("Should find header");
        assert_eq!(idx, 1);
        assert_eq!(required.max_index(), 2);
    }
}
