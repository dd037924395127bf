//! Tables and calendars reached through provider binaries.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SheetCalResult;
use crate::event::Event;
use crate::remote::protocol::{
    CreateEvent, DeleteEvent, GetRows, ListEvents, ListTables, ProviderParams, ResolveCalendar,
    UpdateEvent,
};
use crate::remote::provider::Provider;
use crate::source::{TableRef, TableSource};
use crate::store::{CalendarRef, CalendarStore, RemoteEvent};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for ProviderParams {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A provider plus its settings, e.g.
///
/// ```toml
/// [store]
/// provider = "local"
/// dir = "~/calendars"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }

    fn params(&self) -> ProviderParams {
        ProviderParams::from(&self.config)
    }
}

impl TableSource for Remote {
    async fn list_tables(&self) -> SheetCalResult<Vec<TableRef>> {
        self.provider
            .call(ListTables {
                config: self.params(),
            })
            .await
    }

    async fn get_rows(&self, table: &TableRef) -> SheetCalResult<Vec<Vec<String>>> {
        self.provider
            .call(GetRows {
                config: self.params(),
                table_id: table.id.clone(),
                table_name: table.name.clone(),
            })
            .await
    }
}

impl CalendarStore for Remote {
    async fn resolve_or_create_calendar(&self, name: &str) -> SheetCalResult<CalendarRef> {
        self.provider
            .call(ResolveCalendar {
                config: self.params(),
                name: name.to_string(),
            })
            .await
    }

    async fn list_events(&self, calendar: &CalendarRef) -> SheetCalResult<Vec<RemoteEvent>> {
        self.provider
            .call(ListEvents {
                config: self.params(),
                calendar_id: calendar.id.clone(),
            })
            .await
    }

    async fn insert_event(&self, calendar: &CalendarRef, event: &Event) -> SheetCalResult<String> {
        self.provider
            .call(CreateEvent {
                config: self.params(),
                calendar_id: calendar.id.clone(),
                event: event.clone(),
            })
            .await
    }

    async fn update_event(
        &self,
        calendar: &CalendarRef,
        event_id: &str,
        event: &Event,
    ) -> SheetCalResult<()> {
        self.provider
            .call(UpdateEvent {
                config: self.params(),
                calendar_id: calendar.id.clone(),
                event_id: event_id.to_string(),
                event: event.clone(),
            })
            .await
    }

    async fn delete_event(&self, calendar: &CalendarRef, event_id: &str) -> SheetCalResult<()> {
        self.provider
            .call(DeleteEvent {
                config: self.params(),
                calendar_id: calendar.id.clone(),
                event_id: event_id.to_string(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_from_toml() {
        let remote: Remote = toml::from_str(
            r#"
            provider = "local"
            dir = "/srv/sheetcal"
            pretty = true
            "#,
        )
        .expect("Should parse remote");
        assert_eq!(remote.provider.name(), "local");

        let params = remote.params();
        assert_eq!(params["dir"], "/srv/sheetcal");
        assert_eq!(params["pretty"], true);
        assert!(!params.contains_key("provider"));
    }
}
