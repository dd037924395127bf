//! Core of sheetcal: turns hand-maintained schedule spreadsheets into
//! calendar events and keeps calendars in step with them.
//!
//! - [`parse`] reads date and time cells
//! - [`builder`] turns table rows into [`Event`]s
//! - [`identity`] and [`diff`] pair built events with stored ones and
//!   compute the inserts, updates and deletes
//! - [`sync`] runs whole passes against a [`TableSource`] and a
//!   [`CalendarStore`]

pub mod builder;
pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod identity;
pub mod memory;
pub mod parse;
pub mod remote;
pub mod source;
pub mod store;
pub mod sync;
pub mod validate;

pub use builder::{BuildOptions, BuiltTable, EventBuilder, RowError};
pub use config::SheetCalConfig;
pub use diff::{CalendarDiff, DiffKind, EventDiff, ReconcileOutcome, reconcile};
pub use error::{ParseError, SheetCalError, SheetCalResult, ValidationError};
pub use event::{Event, EventDetails, EventTime};
pub use identity::{canonical_key, events_equal};
pub use memory::{MemorySource, MemoryStore};
pub use parse::{DateParser, DateSpan, ParseOptions, parse_date, parse_time};
pub use remote::Remote;
pub use source::{TableRef, TableSource};
pub use store::{CalendarRef, CalendarStore, RemoteEvent};
pub use sync::{SyncMode, SyncReport, SyncSettings, TableReport, TableStatus, sync_all, sync_table};
