//! sheetcal-provider-local - directory-backed provider for sheetcal
//!
//! Implements both sides of the provider protocol (tables and calendars)
//! against plain JSON files, communicating with sheetcal over
//! stdin/stdout. Configure it with:
//!
//!   [source]
//!   provider = "local"
//!   dir = "~/schedules"
//!
//! Layout under `dir` is described in [`storage`].

mod storage;

use std::io::{self, BufRead, Write};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use sheetcal_core::Event;
use sheetcal_core::remote::protocol::{Command, Request, Response};
use tracing_subscriber::EnvFilter;

use storage::Storage;

fn main() {
    // stdout is the protocol channel; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request),
            Err(e) => Response::<()>::error(&format!("Failed to parse request: {}", e)),
        };

        if let Err(e) = writeln!(stdout, "{}", response).and_then(|_| stdout.flush()) {
            tracing::error!("failed to write response: {}", e);
            break;
        }
    }
}

fn handle_request(request: Request) -> String {
    tracing::debug!(command = ?request.command, "handling request");
    match request.command {
        Command::ListTables => handle_list_tables(request.params),
        Command::GetRows => handle_get_rows(request.params),
        Command::ResolveCalendar => handle_resolve_calendar(request.params),
        Command::ListEvents => handle_list_events(request.params),
        Command::CreateEvent => handle_create_event(request.params),
        Command::UpdateEvent => handle_update_event(request.params),
        Command::DeleteEvent => handle_delete_event(request.params),
    }
}

fn params<P: DeserializeOwned>(value: serde_json::Value) -> Result<P, String> {
    serde_json::from_value(value).map_err(|e| Response::<()>::error(&format!("Invalid params: {}", e)))
}

fn respond<T: serde::Serialize>(result: anyhow::Result<T>) -> String {
    match result {
        Ok(data) => Response::success(data),
        Err(e) => Response::<()>::error(&format!("{:#}", e)),
    }
}

#[derive(Debug, Deserialize)]
struct DirParams {
    dir: String,
}

fn handle_list_tables(value: serde_json::Value) -> String {
    let p: DirParams = match params(value) {
        Ok(p) => p,
        Err(response) => return response,
    };
    respond(Storage::open(&p.dir).list_tables())
}

#[derive(Debug, Deserialize)]
struct GetRowsParams {
    dir: String,
    table_id: String,
}

fn handle_get_rows(value: serde_json::Value) -> String {
    let p: GetRowsParams = match params(value) {
        Ok(p) => p,
        Err(response) => return response,
    };
    respond(Storage::open(&p.dir).get_rows(&p.table_id))
}

#[derive(Debug, Deserialize)]
struct ResolveCalendarParams {
    dir: String,
    name: String,
}

fn handle_resolve_calendar(value: serde_json::Value) -> String {
    let p: ResolveCalendarParams = match params(value) {
        Ok(p) => p,
        Err(response) => return response,
    };
    respond(Storage::open(&p.dir).resolve_calendar(&p.name))
}

#[derive(Debug, Deserialize)]
struct CalendarParams {
    dir: String,
    calendar_id: String,
}

fn handle_list_events(value: serde_json::Value) -> String {
    let p: CalendarParams = match params(value) {
        Ok(p) => p,
        Err(response) => return response,
    };
    respond(Storage::open(&p.dir).list_events(&p.calendar_id))
}

#[derive(Debug, Deserialize)]
struct CreateEventParams {
    dir: String,
    calendar_id: String,
    event: Event,
}

fn handle_create_event(value: serde_json::Value) -> String {
    let p: CreateEventParams = match params(value) {
        Ok(p) => p,
        Err(response) => return response,
    };
    respond(Storage::open(&p.dir).create_event(&p.calendar_id, p.event))
}

#[derive(Debug, Deserialize)]
struct UpdateEventParams {
    dir: String,
    calendar_id: String,
    event_id: String,
    event: Event,
}

fn handle_update_event(value: serde_json::Value) -> String {
    let p: UpdateEventParams = match params(value) {
        Ok(p) => p,
        Err(response) => return response,
    };
    respond(Storage::open(&p.dir).update_event(&p.calendar_id, &p.event_id, p.event))
}

#[derive(Debug, Deserialize)]
struct EventParams {
    dir: String,
    calendar_id: String,
    event_id: String,
}

fn handle_delete_event(value: serde_json::Value) -> String {
    let p: EventParams = match params(value) {
        Ok(p) => p,
        Err(response) => return response,
    };
    respond(Storage::open(&p.dir).delete_event(&p.calendar_id, &p.event_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(dir: &str, command: &str, mut params: serde_json::Value) -> serde_json::Value {
        params["dir"] = json!(dir);
        let request: Request = serde_json::from_value(json!({
            "command": command,
            "params": params,
        }))
        .expect("Should parse request");
        serde_json::from_str(&handle_request(request)).expect("Should be JSON")
    }

    #[test]
    fn test_round_trip_over_protocol() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let dir = tmp.path().to_string_lossy().into_owned();

        let calendar = call(&dir, "resolve_calendar", json!({ "name": "SLOHS Tennis" }));
        assert_eq!(calendar["status"], "success");
        let calendar_id = calendar["data"]["id"].as_str().unwrap().to_string();

        let event = json!({
            "summary": "Tennis - Tournament at Ojai",
            "location": "Ojai",
            "description": "Location: Ojai\nTime: TBD",
            "start": { "date": "2025-03-10" },
            "end": { "date": "2025-03-13" },
        });
        let created = call(
            &dir,
            "create_event",
            json!({ "calendar_id": calendar_id, "event": event }),
        );
        assert_eq!(created["status"], "success");

        let listed = call(&dir, "list_events", json!({ "calendar_id": calendar_id }));
        assert_eq!(listed["data"][0]["summary"], "Tennis - Tournament at Ojai");
        assert_eq!(listed["data"][0]["id"], created["data"]);
    }

    #[test]
    fn test_errors_are_reported_in_band() {
        let tmp = tempfile::tempdir().expect("Should create temp dir");
        let dir = tmp.path().to_string_lossy().into_owned();

        let missing = call(&dir, "get_rows", json!({ "table_id": "Golf", "table_name": "Golf" }));
        assert_eq!(missing["status"], "error");
        assert!(missing["error"].as_str().unwrap().contains("Golf"));

        let request: Request = serde_json::from_value(json!({
            "command": "list_tables",
            "params": {},
        }))
        .unwrap();
        let invalid: serde_json::Value = serde_json::from_str(&handle_request(request)).unwrap();
        assert!(invalid["error"].as_str().unwrap().starts_with("Invalid params"));
    }
}
