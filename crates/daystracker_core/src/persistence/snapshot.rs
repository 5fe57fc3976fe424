use crate::model::event::{validate_collection, Event};
use crate::store::{KeyValueStore, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "events";

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Failure while writing a snapshot.
#[derive(Debug)]
pub enum PersistenceError {
    Encode(serde_json::Error),
    Store(StoreError),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode event snapshot: {err}"),
            Self::Store(err) => write!(f, "failed to write event snapshot: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<StoreError> for PersistenceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Reads and writes whole-collection snapshots through a key-value store.
pub struct SnapshotGateway<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SnapshotGateway<S> {
    /// Gateway over `store` using `DEFAULT_STORAGE_KEY`.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Overwrites the stored snapshot with `events`.
    ///
    /// # Errors
    /// - `Encode` when serialization fails.
    /// - `Store` when the backend rejects the write.
    pub fn save(&mut self, events: &[Event]) -> PersistenceResult<()> {
        let blob = serde_json::to_vec(events)?;
        self.store.set(&self.key, &blob)?;
        debug!(
            "event=snapshot_save module=persistence status=ok events={} bytes={}",
            events.len(),
            blob.len()
        );
        Ok(())
    }

    /// Reads the stored snapshot.
    ///
    /// A missing key, an unreadable store, or a blob that does not decode to a
    /// valid collection all yield an empty collection.
    pub fn load(&self) -> Vec<Event> {
        let blob = match self.store.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("event=snapshot_load module=persistence status=empty reason=missing_key");
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=persistence status=degraded reason=store_read error={err}"
                );
                return Vec::new();
            }
        };

        match decode_snapshot(&blob) {
            Ok(events) => {
                info!(
                    "event=snapshot_load module=persistence status=ok events={}",
                    events.len()
                );
                events
            }
            Err(reason) => {
                // Never log blob contents: they carry user notes.
                warn!(
                    "event=snapshot_load module=persistence status=degraded reason={reason} bytes={}",
                    blob.len()
                );
                Vec::new()
            }
        }
    }
}

fn decode_snapshot(blob: &[u8]) -> Result<Vec<Event>, &'static str> {
    let events: Vec<Event> = serde_json::from_slice(blob).map_err(|_| "malformed_json")?;
    validate_collection(&events).map_err(|_| "invalid_collection")?;
    Ok(events)
}
