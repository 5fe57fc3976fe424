//! Event and record domain model.
//!
//! # Responsibility
//! - Define the persisted event/record shape.
//! - Provide title normalization and snapshot-level validation.
//! - Define the one ordering rule used for record display and day deltas.
//!
//! # Invariants
//! - `Event::title` is stored trimmed and is never empty.
//! - Record ids are unique within their owning event.
//! - Record order is `date DESC, id ASC`; equal instants never reorder
//!   between calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a tracked event.
pub type EventId = Uuid;

/// Stable identifier of a dated record.
pub type RecordId = Uuid;

/// Validation failures for event input and decoded snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// Title is empty after trimming whitespace.
    EmptyTitle,
    /// Two events in one collection share an id.
    DuplicateEventId(EventId),
    /// Two records in one event share an id.
    DuplicateRecordId {
        event_id: EventId,
        record_id: RecordId,
    },
    /// A record id already belongs to a different event.
    RecordOwnedByOtherEvent { record_id: RecordId, owner: EventId },
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title cannot be empty"),
            Self::DuplicateEventId(id) => write!(f, "duplicate event id: {id}"),
            Self::DuplicateRecordId {
                event_id,
                record_id,
            } => write!(f, "duplicate record id {record_id} in event {event_id}"),
            Self::RecordOwnedByOtherEvent { record_id, owner } => {
                write!(f, "record {record_id} already belongs to event {owner}")
            }
        }
    }
}

impl Error for EventValidationError {}

/// One dated occurrence of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: RecordId,
    /// Full timestamp; day-level semantics are applied by `calendar`.
    pub date: DateTime<Utc>,
    /// Free text, may be empty.
    #[serde(default)]
    pub note: String,
}

impl EventRecord {
    /// Creates a record with a generated stable ID.
    pub fn new(date: DateTime<Utc>, note: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), date, note)
    }

    /// Creates a record with a caller-provided stable ID.
    pub fn with_id(id: RecordId, date: DateTime<Utc>, note: impl Into<String>) -> Self {
        Self {
            id,
            date,
            note: note.into(),
        }
    }
}

/// A named thing being tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub records: Vec<EventRecord>,
    /// Display-only flag. Persisted, but ignored by all domain logic.
    #[serde(default)]
    pub is_expanded: bool,
}

impl Event {
    /// Creates an event with a generated ID and no records.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank after trimming.
    pub fn new(title: &str) -> Result<Self, EventValidationError> {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Creates an event with a caller-provided ID and no records.
    pub fn with_id(id: EventId, title: &str) -> Result<Self, EventValidationError> {
        Ok(Self {
            id,
            title: normalize_title(title)?,
            records: Vec::new(),
            is_expanded: false,
        })
    }

    /// Checks title and record-id invariants.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        let mut seen = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            if !seen.insert(record.id) {
                return Err(EventValidationError::DuplicateRecordId {
                    event_id: self.id,
                    record_id: record.id,
                });
            }
        }
        Ok(())
    }

    /// Looks up one owned record by id.
    pub fn record(&self, record_id: RecordId) -> Option<&EventRecord> {
        self.records.iter().find(|record| record.id == record_id)
    }

    pub(crate) fn record_mut(&mut self, record_id: RecordId) -> Option<&mut EventRecord> {
        self.records.iter_mut().find(|record| record.id == record_id)
    }

    /// Returns records newest first, ties broken by ascending record id.
    pub fn sorted_records(&self) -> Vec<&EventRecord> {
        let mut sorted: Vec<&EventRecord> = self.records.iter().collect();
        sorted.sort_by(|left, right| compare_newest_first(left, right));
        sorted
    }

    /// Returns the first record of `sorted_records`.
    pub fn latest_record(&self) -> Option<&EventRecord> {
        self.records
            .iter()
            .min_by(|left, right| compare_newest_first(left, right))
    }
}

/// Display ordering for records: `date DESC`, then `id ASC`.
pub fn compare_newest_first(left: &EventRecord, right: &EventRecord) -> Ordering {
    right
        .date
        .cmp(&left.date)
        .then_with(|| left.id.cmp(&right.id))
}

/// Trims `title` and rejects it when nothing is left.
pub fn normalize_title(title: &str) -> Result<String, EventValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(EventValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Validates a whole collection: every event, plus event-id and record-id
/// uniqueness across events.
pub fn validate_collection(events: &[Event]) -> Result<(), EventValidationError> {
    let mut seen_events = HashSet::with_capacity(events.len());
    let mut record_owners: HashMap<RecordId, EventId> = HashMap::new();
    for event in events {
        if !seen_events.insert(event.id) {
            return Err(EventValidationError::DuplicateEventId(event.id));
        }
        event.validate()?;
        for record in &event.records {
            if let Some(owner) = record_owners.insert(record.id, event.id) {
                return Err(EventValidationError::RecordOwnedByOtherEvent {
                    record_id: record.id,
                    owner,
                });
            }
        }
    }
    Ok(())
}

/// Returns the event owning `record_id`, if any.
pub fn record_owner(events: &[Event], record_id: RecordId) -> Option<EventId> {
    events
        .iter()
        .find(|event| event.record(record_id).is_some())
        .map(|event| event.id)
}
