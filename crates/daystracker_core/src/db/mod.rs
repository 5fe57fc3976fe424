//! SQLite bootstrap for the durable key-value store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections with core pragmas applied.
//! - Bring the `kv_entries` schema up to date before first use.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection returned from this module has every migration applied.
//! - A failed migration step rolls back every step of the same run.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the store database.
#[derive(Debug)]
pub enum DbError {
    /// Connection-level or query failure outside a migration step.
    Sqlite(rusqlite::Error),
    /// Migration `version` failed; the schema stays at its previous version.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// Database was written by a newer build than this one.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl DbError {
    /// Stable code for `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "db_sqlite",
            Self::Migration { .. } => "db_migration_failed",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Migration { version, source } => {
                write!(f, "schema migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "store schema v{found} was written by a newer build (this build supports up to v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;

    #[test]
    fn codes_and_messages_identify_the_failure() {
        let err = DbError::UnsupportedSchemaVersion {
            found: 7,
            supported: 1,
        };
        assert_eq!(err.code(), "db_schema_too_new");
        assert!(err.to_string().contains("v7"));

        let err = DbError::Migration {
            version: 2,
            source: rusqlite::Error::InvalidQuery,
        };
        assert_eq!(err.code(), "db_migration_failed");
        assert!(err.to_string().starts_with("schema migration 2 failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
