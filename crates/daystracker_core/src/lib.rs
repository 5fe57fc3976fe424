//! Core domain logic for DaysTracker.
//! Tracks named events and their dated records, and answers "how many days
//! since" questions. This crate is the single source of truth for the
//! event/record invariants; the UI layer only calls into it.

pub mod calendar;
pub mod config;
pub mod db;
pub mod entry;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod query;
pub mod repo;
pub mod store;

pub use calendar::{
    calendar_day, days_between, format_day_label, is_same_calendar_day, start_of_day, Clock,
    FixedClock, SystemClock,
};
pub use config::{ConfigError, CoreConfig};
pub use entry::{open_repository, EntryError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{Event, EventId, EventRecord, EventValidationError, RecordId};
pub use persistence::{PersistenceError, SnapshotGateway, DEFAULT_STORAGE_KEY};
pub use query::{
    days_from_previous, days_since_latest, event_views, filtered_events, record_rows, EventView,
    RecordRow,
};
pub use repo::event_repo::{EventRepository, RepoError, RepoResult};
pub use store::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
