//! Tables and calendars as JSON files in one directory:
//!
//!   {dir}/tables/{name}.json     array of rows, each an array of cells
//!   {dir}/calendars/{id}.json    {"id", "name", "events": [...]}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sheetcal_core::{CalendarRef, Event, RemoteEvent, TableRef};

#[derive(Debug, Serialize, Deserialize)]
struct CalendarFile {
    id: String,
    name: String,
    #[serde(default)]
    events: Vec<RemoteEvent>,
}

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn open(dir: &str) -> Self {
        Storage {
            root: PathBuf::from(shellexpand::tilde(dir).into_owned()),
        }
    }

    fn tables_dir(&self) -> PathBuf {
        self.root.join("tables")
    }

    fn calendars_dir(&self) -> PathBuf {
        self.root.join("calendars")
    }

    fn calendar_path(&self, calendar_id: &str) -> Result<PathBuf> {
        if calendar_id.is_empty() || calendar_id.contains(['/', '\\']) || calendar_id.starts_with('.') {
            bail!("Invalid calendar id '{}'", calendar_id);
        }
        Ok(self.calendars_dir().join(format!("{calendar_id}.json")))
    }

    /// Tables sorted by name. A missing tables directory means no tables.
    pub fn list_tables(&self) -> Result<Vec<TableRef>> {
        let mut names = json_stems(&self.tables_dir())?;
        names.sort();
        Ok(names.into_iter().map(TableRef::named).collect())
    }

    /// Cells as text. Numbers and booleans are stringified; nulls become
    /// empty cells.
    pub fn get_rows(&self, table_id: &str) -> Result<Vec<Vec<String>>> {
        if table_id.contains(['/', '\\']) {
            bail!("Invalid table id '{}'", table_id);
        }
        let path = self.tables_dir().join(format!("{table_id}.json"));
        let rows: Vec<Vec<serde_json::Value>> = read_json(&path)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    pub fn resolve_calendar(&self, name: &str) -> Result<CalendarRef> {
        for id in json_stems(&self.calendars_dir())? {
            let file: CalendarFile = read_json(&self.calendar_path(&id)?)?;
            if file.name == name {
                return Ok(CalendarRef {
                    id: file.id,
                    name: file.name,
                });
            }
        }

        let file = CalendarFile {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            events: Vec::new(),
        };
        self.save(&file)?;
        tracing::info!(id = %file.id, name, "created calendar");

        Ok(CalendarRef {
            id: file.id,
            name: file.name,
        })
    }

    pub fn list_events(&self, calendar_id: &str) -> Result<Vec<RemoteEvent>> {
        Ok(self.load(calendar_id)?.events)
    }

    pub fn create_event(&self, calendar_id: &str, event: Event) -> Result<String> {
        let mut file = self.load(calendar_id)?;
        let id = uuid::Uuid::new_v4().to_string();
        file.events.push(RemoteEvent {
            id: id.clone(),
            event,
        });
        self.save(&file)?;
        Ok(id)
    }

    pub fn update_event(&self, calendar_id: &str, event_id: &str, event: Event) -> Result<()> {
        let mut file = self.load(calendar_id)?;
        let slot = file
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .with_context(|| format!("Event '{}' not found", event_id))?;
        slot.event = event;
        self.save(&file)
    }

    pub fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let mut file = self.load(calendar_id)?;
        let before = file.events.len();
        file.events.retain(|e| e.id != event_id);
        if file.events.len() == before {
            bail!("Event '{}' not found", event_id);
        }
        self.save(&file)
    }

    fn load(&self, calendar_id: &str) -> Result<CalendarFile> {
        read_json(&self.calendar_path(calendar_id)?)
    }

    /// Write through a temp file so a crash never leaves half a calendar.
    fn save(&self, file: &CalendarFile) -> Result<()> {
        let path = self.calendar_path(&file.id)?;
        let dir = self.calendars_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Could not create {}", dir.display()))?;

        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(file)?;
        fs::write(&tmp, contents).with_context(|| format!("Could not write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("Could not write {}", path.display()))?;
        Ok(())
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// File stems of `*.json` files in a directory.
fn json_stems(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("Could not read {}", dir.display())),
    };

    Ok(entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcal_core::{EventDetails, EventTime};

    fn storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let storage = Storage::open(&dir.path().to_string_lossy());
        (dir, storage)
    }

    fn event(summary: &str) -> Event {
        Event {
            summary: summary.to_string(),
            location: "Arroyo Grande".into(),
            description: String::new(),
            start: EventTime::DateTime {
                date_time: "2025-03-04T16:00:00".into(),
                time_zone: Some("America/Los_Angeles".into()),
            },
            end: EventTime::DateTime {
                date_time: "2025-03-04T18:00:00".into(),
                time_zone: Some("America/Los_Angeles".into()),
            },
            details: EventDetails::default(),
        }
    }

    #[test]
    fn test_tables() {
        let (dir, storage) = storage();
        assert!(storage.list_tables().unwrap().is_empty());

        let tables = dir.path().join("tables");
        fs::create_dir_all(&tables).unwrap();
        fs::write(
            tables.join("Tennis.json"),
            r#"[["Date", "Event"], ["3/4", "Match", 4, null]]"#,
        )
        .unwrap();
        fs::write(tables.join("Golf.json"), "[]").unwrap();
        fs::write(tables.join("README.txt"), "not a table").unwrap();

        let names: Vec<String> = storage.list_tables().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Golf", "Tennis"]);

        let rows = storage.get_rows("Tennis").unwrap();
        assert_eq!(rows[1], vec!["3/4", "Match", "4", ""]);
        assert!(storage.get_rows("Swim").is_err());
        assert!(storage.get_rows("../secrets").is_err());
    }

    #[test]
    fn test_calendar_lifecycle() {
        let (_dir, storage) = storage();

        let calendar = storage.resolve_calendar("SLOHS Tennis").expect("Should create");
        let again = storage.resolve_calendar("SLOHS Tennis").expect("Should resolve");
        assert_eq!(calendar, again);

        let id = storage.create_event(&calendar.id, event("Match")).unwrap();
        storage.create_event(&calendar.id, event("Dual")).unwrap();
        assert_eq!(storage.list_events(&calendar.id).unwrap().len(), 2);

        let mut changed = event("Match");
        changed.description = "Bring water".into();
        storage.update_event(&calendar.id, &id, changed).unwrap();
        let events = storage.list_events(&calendar.id).unwrap();
        assert_eq!(events[0].event.description, "Bring water");

        storage.delete_event(&calendar.id, &id).unwrap();
        let events = storage.list_events(&calendar.id).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.summary, "Dual");

        assert!(storage.delete_event(&calendar.id, &id).is_err());
        assert!(storage.update_event(&calendar.id, "nope", event("x")).is_err());
    }

    #[test]
    fn test_rejects_path_like_calendar_ids() {
        let (_dir, storage) = storage();
        assert!(storage.list_events("../etc").is_err());
        assert!(storage.list_events("").is_err());
    }
}
