//! Byte-oriented key-value storage behind the persistence gateway.
//!
//! # Responsibility
//! - Define the `get`/`set` contract the snapshot gateway depends on.
//! - Provide an in-memory and a SQLite-backed implementation.
//!
//! # Invariants
//! - `set` overwrites the whole value for a key; there is no merge.
//! - `get` of a never-written key returns `Ok(None)`, not an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-level failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Backend refused the operation for a non-database reason.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "key-value store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed byte store persisted across restarts.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()>;
}
