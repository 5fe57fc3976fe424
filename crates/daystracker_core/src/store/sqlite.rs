//! SQLite-backed key-value store.
//!
//! # Invariants
//! - One row per key in `kv_entries`; `set` is an upsert.
//! - The connection is migrated before the store is constructed.

use super::{KeyValueStore, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) a store in the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a store in a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStore;
    use crate::store::KeyValueStore;

    #[test]
    fn upsert_keeps_one_row_per_key() {
        let mut store = SqliteKvStore::open_in_memory().unwrap();
        assert_eq!(store.get("events").unwrap(), None);

        store.set("events", b"[]").unwrap();
        store.set("events", b"[1]").unwrap();
        store.set("other", b"x").unwrap();

        assert_eq!(store.get("events").unwrap().as_deref(), Some(&b"[1]"[..]));
        let rows: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 2);
    }
}
