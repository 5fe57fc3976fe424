//! Snapshot persistence of the full event collection.
//!
//! # Responsibility
//! - Encode/decode the collection as one JSON blob under a fixed key.
//! - Degrade unreadable snapshots to an empty collection.
//!
//! # Invariants
//! - Every save writes the whole collection; there is no delta format.
//! - `load` never returns an error to its caller.

mod snapshot;

pub use snapshot::{PersistenceError, PersistenceResult, SnapshotGateway, DEFAULT_STORAGE_KEY};
