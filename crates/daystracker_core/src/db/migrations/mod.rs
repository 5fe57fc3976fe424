//! Ordered schema migrations.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - Pending migrations run inside one transaction; `user_version` is bumped
//!   per step so a partial run is never committed.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Latest schema version this build knows how to write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies every migration newer than the database's `user_version`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is ahead of this build.
/// - `Migration` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    run_migrations(conn, MIGRATIONS)
}

fn run_migrations(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    let current = current_user_version(conn)?;
    let latest = migrations.last().map_or(0, |migration| migration.version);

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current,
            supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in migrations.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", migration.version))
            .map_err(|source| DbError::Migration {
                version: migration.version,
                source,
            })?;
    }
    tx.commit()?;
    Ok(())
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
