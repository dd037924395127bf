//! JSON protocol spoken between sheetcal and provider binaries over
//! stdin/stdout.
//!
//! A provider reads one [`Request`] line and answers with one
//! [`Response`]. Every request carries the provider's own config keys
//! (flattened), so providers stay stateless.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::Event;
use crate::source::TableRef;
use crate::store::{CalendarRef, RemoteEvent};

pub type ProviderParams = serde_json::Map<String, serde_json::Value>;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListTables,
    GetRows,
    ResolveCalendar,
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

/// Request sent from sheetcal to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider back to sheetcal.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|e| Response::<()>::error(&format!("failed to encode response: {e}")))
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::json!({ "status": "error", "error": msg }).to_string()
    }
}

// ============================================================================
// Table commands
// ============================================================================

/// List the tables (sheets) of the configured spreadsheet.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListTables {
    #[serde(flatten)]
    pub config: ProviderParams,
}

impl ProviderCommand for ListTables {
    type Response = Vec<TableRef>;
    fn command() -> Command {
        Command::ListTables
    }
}

/// Fetch the displayed cell text of one table.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetRows {
    #[serde(flatten)]
    pub config: ProviderParams,
    pub table_id: String,
    pub table_name: String,
}

impl ProviderCommand for GetRows {
    type Response = Vec<Vec<String>>;
    fn command() -> Command {
        Command::GetRows
    }
}

// ============================================================================
// Calendar commands
// ============================================================================

/// Find a calendar by display name, creating it when missing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveCalendar {
    #[serde(flatten)]
    pub config: ProviderParams,
    pub name: String,
}

impl ProviderCommand for ResolveCalendar {
    type Response = CalendarRef;
    fn command() -> Command {
        Command::ResolveCalendar
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(flatten)]
    pub config: ProviderParams,
    pub calendar_id: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub config: ProviderParams,
    pub calendar_id: String,
    pub event: Event,
}

impl ProviderCommand for CreateEvent {
    /// Store-assigned event id
    type Response = String;
    fn command() -> Command {
        Command::CreateEvent
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(flatten)]
    pub config: ProviderParams,
    pub calendar_id: String,
    pub event_id: String,
    pub event: Event,
}

impl ProviderCommand for UpdateEvent {
    type Response = ();
    fn command() -> Command {
        Command::UpdateEvent
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub config: ProviderParams,
    pub calendar_id: String,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let mut config = ProviderParams::new();
        config.insert("dir".into(), "/tmp/cal".into());
        let params = serde_json::to_value(DeleteEvent {
            config,
            calendar_id: "c1".into(),
            event_id: "e1".into(),
        })
        .unwrap();
        let request = Request {
            command: DeleteEvent::command(),
            params,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["command"], "delete_event");
        assert_eq!(json["params"]["dir"], "/tmp/cal");
        assert_eq!(json["params"]["event_id"], "e1");
    }

    #[test]
    fn test_response_round_trip() {
        let ok = Response::success(vec!["a".to_string()]);
        let parsed: Response<Vec<String>> = serde_json::from_str(&ok).unwrap();
        assert!(matches!(parsed, Response::Success { data } if data == ["a"]));

        let err = Response::error("nope");
        let parsed: Response<()> = serde_json::from_str(&err).unwrap();
        assert!(matches!(parsed, Response::Error { error } if error == "nope"));

        let unit: Response<()> =
            serde_json::from_str(r#"{"status":"success","data":null}"#).unwrap();
        assert!(matches!(unit, Response::Success { .. }));
    }
}
