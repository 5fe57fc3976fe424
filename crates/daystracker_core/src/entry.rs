//! Entry point used by the host app to obtain a ready repository.
//!
//! # Responsibility
//! - Turn a `CoreConfig` into an opened, loaded `EventRepository`.
//! - Start logging first when the config asks for it.

use crate::config::{ConfigError, CoreConfig};
use crate::logging::init_logging;
use crate::persistence::SnapshotGateway;
use crate::repo::event_repo::EventRepository;
use crate::store::{SqliteKvStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum EntryError {
    Config(ConfigError),
    Logging(String),
    Store(StoreError),
}

impl Display for EntryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "failed to initialize logging: {message}"),
            Self::Store(err) => write!(f, "failed to open event store: {err}"),
        }
    }
}

impl Error for EntryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for EntryError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for EntryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Opens the SQLite-backed repository described by `config`.
///
/// # Side effects
/// - May initialize process-wide logging.
/// - Creates the database file and schema when missing.
pub fn open_repository(config: &CoreConfig) -> Result<EventRepository<SqliteKvStore>, EntryError> {
    config.validate()?;

    if let (Some(level), Some(dir)) = (&config.log_level, &config.log_dir) {
        let dir = dir
            .to_str()
            .ok_or_else(|| EntryError::Logging("log_dir must be valid UTF-8".to_string()))?;
        init_logging(level, dir).map_err(EntryError::Logging)?;
    }

    let store = match &config.db_path {
        Some(path) => SqliteKvStore::open(path)?,
        None => SqliteKvStore::open_in_memory()?,
    };
    let repo = EventRepository::open(SnapshotGateway::with_key(store, config.storage_key.clone()));
    info!(
        "event=core_open module=entry status=ok persistent={} events={}",
        config.db_path.is_some(),
        repo.len()
    );
    Ok(repo)
}
