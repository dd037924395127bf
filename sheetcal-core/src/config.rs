//! Configuration at ~/.config/sheetcal/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::{Datelike, Duration, Local, NaiveTime};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::builder::{BuildOptions, DEFAULT_TIME_ZONE};
use crate::error::{SheetCalError, SheetCalResult};
use crate::parse::{DEFAULT_MAX_RANGE_DAYS, ParseOptions};
use crate::remote::Remote;
use crate::sync::SyncSettings;

fn default_timezone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_time() -> String {
    "15:30".to_string()
}

fn default_event_duration() -> String {
    "2h".to_string()
}

fn default_max_range_days() -> i64 {
    DEFAULT_MAX_RANGE_DAYS
}

fn default_table_timeout() -> String {
    "2m".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCalConfig {
    /// Year for dates written without one. Defaults to the current year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_year: Option<i32>,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Start time for rows whose time cell cannot be read (`HH:MM`).
    #[serde(default = "default_time")]
    pub default_time: String,

    #[serde(default = "default_event_duration")]
    pub event_duration: String,

    #[serde(default = "default_max_range_days")]
    pub max_range_days: i64,

    #[serde(default = "default_table_timeout")]
    pub table_timeout: String,

    /// Prepended to the table category to name the target calendar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_prefix: Option<String>,

    /// Only sync these tables. Empty means every table the source lists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Remote>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<Remote>,
}

impl Default for SheetCalConfig {
    fn default() -> Self {
        SheetCalConfig {
            default_year: None,
            timezone: default_timezone(),
            default_time: default_time(),
            event_duration: default_event_duration(),
            max_range_days: default_max_range_days(),
            table_timeout: default_table_timeout(),
            calendar_prefix: None,
            tables: Vec::new(),
            source: None,
            store: None,
        }
    }
}

impl SheetCalConfig {
    pub fn config_path() -> SheetCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SheetCalError::Config("Could not determine config directory".into()))?
            .join("sheetcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user config, creating a commented-out default on first run.
    pub fn load() -> SheetCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from a specific file, layered with `SHEETCAL__*` environment
    /// overrides (e.g. `SHEETCAL__TIMEZONE=America/Denver`).
    pub fn load_from(path: &Path) -> SheetCalResult<Self> {
        let mut config: SheetCalConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("SHEETCAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SheetCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SheetCalError::Config(e.to_string()))?;

        for remote in [&mut config.source, &mut config.store].into_iter().flatten() {
            expand_tilde(remote);
        }

        config.validate()?;
        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SheetCalResult<()> {
        let contents = format!(
            "\
# sheetcal configuration

# Year for dates written without one (defaults to the current year):
# default_year = 2025

# Time zone attached to timed events:
# timezone = \"{}\"

# Start time used when a time cell can't be read, and event length:
# default_time = \"{}\"
# event_duration = \"{}\"

# Longest accepted date range, in days:
# max_range_days = {}

# Give up on a table after:
# table_timeout = \"{}\"

# Calendars are named \"<prefix> <category>\":
# calendar_prefix = \"SLOHS\"

# Only sync these tables:
# tables = [\"Tennis\", \"Golf\"]

# Where tables come from and where events go:
# [source]
# provider = \"local\"
# dir = \"~/sheetcal\"
#
# [store]
# provider = \"local\"
# dir = \"~/sheetcal\"
",
            DEFAULT_TIME_ZONE,
            default_time(),
            default_event_duration(),
            DEFAULT_MAX_RANGE_DAYS,
            default_table_timeout(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SheetCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SheetCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn validate(&self) -> SheetCalResult<()> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| SheetCalError::Config(format!("Unknown timezone '{}'", self.timezone)))?;
        self.parsed_default_time()?;
        self.parsed_event_duration()?;
        self.parsed_table_timeout()?;
        if self.max_range_days < 1 {
            return Err(SheetCalError::Config(format!(
                "max_range_days must be at least 1, got {}",
                self.max_range_days
            )));
        }
        Ok(())
    }

    fn parsed_default_time(&self) -> SheetCalResult<NaiveTime> {
        NaiveTime::parse_from_str(self.default_time.trim(), "%H:%M").map_err(|e| {
            SheetCalError::Config(format!("Invalid default_time '{}': {e}", self.default_time))
        })
    }

    fn parsed_event_duration(&self) -> SheetCalResult<Duration> {
        let duration = parse_duration("event_duration", &self.event_duration)?;
        Duration::from_std(duration)
            .ok()
            .filter(|d| *d > Duration::zero())
            .ok_or_else(|| {
                SheetCalError::Config(format!("event_duration '{}' is out of range", self.event_duration))
            })
    }

    fn parsed_table_timeout(&self) -> SheetCalResult<StdDuration> {
        parse_duration("table_timeout", &self.table_timeout)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            default_year: self.default_year.unwrap_or_else(|| Local::now().year()),
            max_range_days: self.max_range_days,
        }
    }

    pub fn build_options(&self) -> SheetCalResult<BuildOptions> {
        Ok(BuildOptions {
            parse: self.parse_options(),
            time_zone: self.timezone.clone(),
            default_time: self.parsed_default_time()?,
            event_duration: self.parsed_event_duration()?,
        })
    }

    pub fn sync_settings(&self) -> SheetCalResult<SyncSettings> {
        Ok(SyncSettings {
            build: self.build_options()?,
            calendar_prefix: self.calendar_prefix.clone(),
            table_timeout: self.parsed_table_timeout()?,
        })
    }

    pub fn source(&self) -> SheetCalResult<&Remote> {
        self.source
            .as_ref()
            .ok_or_else(|| SheetCalError::Config("No [source] section in config".into()))
    }

    pub fn store(&self) -> SheetCalResult<&Remote> {
        self.store
            .as_ref()
            .ok_or_else(|| SheetCalError::Config("No [store] section in config".into()))
    }
}

fn parse_duration(key: &str, value: &str) -> SheetCalResult<StdDuration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| SheetCalError::Config(format!("Invalid {key} '{value}': {e}")))
}

fn expand_tilde(remote: &mut Remote) {
    for value in remote.config.0.values_mut() {
        if let toml::Value::String(s) = value {
            *s = shellexpand::tilde(s.as_str()).into_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("Should write config");
        (dir, path)
    }

    #[test]
    fn test_defaults() {
        let (_dir, path) = write_config("");
        let config = SheetCalConfig::load_from(&path).expect("Should load");
        assert_eq!(config.timezone, "America/Los_Angeles");

        let settings = config.sync_settings().unwrap();
        assert_eq!(settings.build.default_time, NaiveTime::from_hms_opt(15, 30, 0).unwrap());
        assert_eq!(settings.build.event_duration, Duration::hours(2));
        assert_eq!(settings.build.parse.max_range_days, 7);
        assert_eq!(settings.table_timeout, StdDuration::from_secs(120));
    }

    #[test]
    fn test_full_config() {
        let (_dir, path) = write_config(
            r#"
            default_year = 2025
            timezone = "America/Denver"
            default_time = "16:00"
            event_duration = "90m"
            calendar_prefix = "SLOHS"
            tables = ["Tennis"]

            [store]
            provider = "local"
            dir = "~/sheetcal"
            "#,
        );
        let config = SheetCalConfig::load_from(&path).expect("Should load");
        let build = config.build_options().unwrap();
        assert_eq!(build.parse.default_year, 2025);
        assert_eq!(build.event_duration, Duration::minutes(90));
        assert_eq!(config.tables, vec!["Tennis".to_string()]);

        let store = config.store().expect("Should have store");
        assert_eq!(store.provider.name(), "local");
        let dir = store.config.0["dir"].as_str().unwrap();
        assert!(!dir.starts_with('~'));
        assert!(config.source().is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        let (_dir, path) = write_config(r#"timezone = "Mars/Olympus""#);
        assert!(matches!(SheetCalConfig::load_from(&path), Err(SheetCalError::Config(_))));

        let (_dir, path) = write_config(r#"default_time = "half past three""#);
        assert!(SheetCalConfig::load_from(&path).is_err());

        let (_dir, path) = write_config(r#"event_duration = "soon""#);
        assert!(SheetCalConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_default_config_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        SheetCalConfig::create_default_config(&path).expect("Should write default");
        let config = SheetCalConfig::load_from(&path).expect("Should load default");
        assert_eq!(config, SheetCalConfig::default());
    }
}
