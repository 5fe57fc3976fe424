//! Event repository over a snapshot gateway.
//!
//! # Responsibility
//! - Provide id-keyed CRUD for events and their records.
//! - Run every mutation as "apply to working copy, save, commit".
//!
//! # Invariants
//! - In-memory state always equals the last snapshot that saved successfully
//!   (or the loaded snapshot, before the first mutation).
//! - Unknown ids fail with `EventNotFound` / `RecordNotFound`; no mutator is
//!   a silent no-op.

use crate::model::event::{
    record_owner, Event, EventId, EventRecord, EventValidationError, RecordId,
};
use crate::persistence::{PersistenceError, SnapshotGateway};
use crate::query::days::{days_from_previous, days_since_latest};
use crate::store::KeyValueStore;
use chrono::{DateTime, TimeZone, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event and record operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    EventNotFound(EventId),
    RecordNotFound {
        event_id: EventId,
        record_id: RecordId,
    },
    Persistence(PersistenceError),
}

impl RepoError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::EventNotFound(_) => "event_not_found",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::Persistence(_) => "persistence",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::RecordNotFound {
                event_id,
                record_id,
            } => write!(f, "record {record_id} not found in event {event_id}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::EventNotFound(_) | Self::RecordNotFound { .. } => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for RepoError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Owns the event collection and writes it through `SnapshotGateway`.
pub struct EventRepository<S: KeyValueStore> {
    gateway: SnapshotGateway<S>,
    events: Vec<Event>,
}

impl<S: KeyValueStore> EventRepository<S> {
    /// Loads the stored snapshot and takes ownership of the gateway.
    ///
    /// Never fails: unreadable snapshots start an empty collection.
    pub fn open(gateway: SnapshotGateway<S>) -> Self {
        let events = gateway.load();
        Self { gateway, events }
    }

    /// Events in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, event_id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == event_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn gateway(&self) -> &SnapshotGateway<S> {
        &self.gateway
    }

    pub fn into_gateway(self) -> SnapshotGateway<S> {
        self.gateway
    }

    /// Creates an event with no records and appends it.
    ///
    /// # Errors
    /// - `Validation(EmptyTitle)` when `title` is blank after trimming.
    pub fn add_event(&mut self, title: &str) -> RepoResult<Event> {
        let event = Event::new(title)?;
        self.commit("add_event", |events| {
            events.push(event.clone());
            Ok(event)
        })
    }

    /// Removes an event together with all of its records.
    ///
    /// Returns the removed event.
    pub fn delete_event(&mut self, event_id: EventId) -> RepoResult<Event> {
        self.commit("delete_event", |events| {
            let index = events
                .iter()
                .position(|event| event.id == event_id)
                .ok_or(RepoError::EventNotFound(event_id))?;
            Ok(events.remove(index))
        })
    }

    /// Appends a new record. Any date is accepted, past or future.
    pub fn add_record(
        &mut self,
        event_id: EventId,
        date: DateTime<Utc>,
        note: impl Into<String>,
    ) -> RepoResult<EventRecord> {
        let record = EventRecord::new(date, note);
        self.commit("add_record", |events| {
            find_event_mut(events, event_id)?.records.push(record.clone());
            Ok(record)
        })
    }

    /// Replaces date and note of an existing record; its id is kept.
    pub fn update_record(
        &mut self,
        event_id: EventId,
        record_id: RecordId,
        date: DateTime<Utc>,
        note: impl Into<String>,
    ) -> RepoResult<EventRecord> {
        let note = note.into();
        self.commit("update_record", |events| {
            let record = find_event_mut(events, event_id)?
                .record_mut(record_id)
                .ok_or(RepoError::RecordNotFound {
                    event_id,
                    record_id,
                })?;
            record.date = date;
            record.note = note;
            Ok(record.clone())
        })
    }

    /// Inserts `record` or replaces the record with the same id.
    ///
    /// Used by editors that do not distinguish "new" from "edit" on save.
    ///
    /// # Errors
    /// - `EventNotFound` when `event_id` is unknown.
    /// - `Validation(RecordOwnedByOtherEvent)` when `record.id` belongs to a
    ///   different event.
    pub fn save_record(&mut self, event_id: EventId, record: EventRecord) -> RepoResult<EventRecord> {
        self.commit("save_record", |events| {
            let owner = record_owner(events, record.id);
            let event = find_event_mut(events, event_id)?;
            if let Some(owner) = owner.filter(|owner| *owner != event_id) {
                return Err(EventValidationError::RecordOwnedByOtherEvent {
                    record_id: record.id,
                    owner,
                }
                .into());
            }
            match event.record_mut(record.id) {
                Some(existing) => *existing = record.clone(),
                None => event.records.push(record.clone()),
            }
            Ok(record)
        })
    }

    /// Removes exactly one record and returns it.
    pub fn delete_record(&mut self, event_id: EventId, record_id: RecordId) -> RepoResult<EventRecord> {
        self.commit("delete_record", |events| {
            let event = find_event_mut(events, event_id)?;
            let index = event
                .records
                .iter()
                .position(|record| record.id == record_id)
                .ok_or(RepoError::RecordNotFound {
                    event_id,
                    record_id,
                })?;
            Ok(event.records.remove(index))
        })
    }

    /// Flips the display-only expansion flag and returns the new value.
    pub fn toggle_expanded(&mut self, event_id: EventId) -> RepoResult<bool> {
        self.commit("toggle_expanded", |events| {
            let event = find_event_mut(events, event_id)?;
            event.is_expanded = !event.is_expanded;
            Ok(event.is_expanded)
        })
    }

    /// Records of one event, newest first.
    pub fn sorted_records(&self, event_id: EventId) -> RepoResult<Vec<&EventRecord>> {
        Ok(self.require_event(event_id)?.sorted_records())
    }

    /// Days from the latest record of `event_id` to `now`; `None` without records.
    pub fn days_since_latest<Tz: TimeZone>(
        &self,
        event_id: EventId,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> RepoResult<Option<i64>> {
        Ok(days_since_latest(self.require_event(event_id)?, now, tz))
    }

    /// Days between `record_id` and the record before it; `0` for the oldest.
    pub fn days_from_previous<Tz: TimeZone>(
        &self,
        event_id: EventId,
        record_id: RecordId,
        tz: &Tz,
    ) -> RepoResult<i64> {
        days_from_previous(self.require_event(event_id)?, record_id, tz).ok_or(
            RepoError::RecordNotFound {
                event_id,
                record_id,
            },
        )
    }

    fn require_event(&self, event_id: EventId) -> RepoResult<&Event> {
        self.event(event_id).ok_or(RepoError::EventNotFound(event_id))
    }

    fn commit<T>(
        &mut self,
        operation: &'static str,
        mutate: impl FnOnce(&mut Vec<Event>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut working = self.events.clone();
        let outcome = mutate(&mut working).and_then(|value| {
            self.gateway.save(&working)?;
            Ok(value)
        });

        match outcome {
            Ok(value) => {
                self.events = working;
                info!(
                    "event=repo_mutation module=repo status=ok op={operation} events={}",
                    self.events.len()
                );
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event=repo_mutation module=repo status=error op={operation} error_code={}",
                    err.code()
                );
                Err(err)
            }
        }
    }
}

fn find_event_mut(events: &mut [Event], event_id: EventId) -> RepoResult<&mut Event> {
    events
        .iter_mut()
        .find(|event| event.id == event_id)
        .ok_or(RepoError::EventNotFound(event_id))
}

#[cfg(test)]
mod tests {
    use super::{EventRepository, RepoError};
    use crate::model::event::{EventRecord, EventValidationError};
    use crate::persistence::SnapshotGateway;
    use crate::store::MemoryKvStore;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn repo() -> EventRepository<MemoryKvStore> {
        EventRepository::open(SnapshotGateway::new(MemoryKvStore::new()))
    }

    #[test]
    fn add_event_appends_in_insertion_order() {
        let mut repo = repo();
        let first = repo.add_event("Running").unwrap();
        let second = repo.add_event("Dentist").unwrap();

        let ids: Vec<_> = repo.events().iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn toggle_expanded_flips_flag() {
        let mut repo = repo();
        let event = repo.add_event("Running").unwrap();
        assert!(repo.toggle_expanded(event.id).unwrap());
        assert!(!repo.toggle_expanded(event.id).unwrap());

        let err = repo.toggle_expanded(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, RepoError::EventNotFound(_)));
    }

    #[test]
    fn save_record_inserts_then_replaces() {
        let mut repo = repo();
        let event = repo.add_event("Haircut").unwrap();
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut record = EventRecord::new(date, "short");

        repo.save_record(event.id, record.clone()).unwrap();
        record.note = "very short".to_string();
        repo.save_record(event.id, record.clone()).unwrap();

        let stored = repo.event(event.id).unwrap();
        assert_eq!(stored.records, vec![record]);
    }

    #[test]
    fn save_record_rejects_record_owned_by_another_event() {
        let mut repo = repo();
        let gym = repo.add_event("Gym").unwrap();
        let swim = repo.add_event("Swim").unwrap();
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let record = repo.add_record(gym.id, date, "legs").unwrap();

        let err = repo
            .save_record(
                swim.id,
                EventRecord::with_id(record.id, date, "copied"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(EventValidationError::RecordOwnedByOtherEvent { record_id, owner })
                if record_id == record.id && owner == gym.id
        ));
        assert!(repo.event(swim.id).unwrap().records.is_empty());
        assert_eq!(repo.event(gym.id).unwrap().records, vec![record]);

        let reopened = EventRepository::open(repo.into_gateway());
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn lookups_by_unknown_record_fail() {
        let mut repo = repo();
        let event = repo.add_event("Running").unwrap();
        let missing = Uuid::new_v4();
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for err in [
            repo.update_record(event.id, missing, date, "").unwrap_err(),
            repo.delete_record(event.id, missing).unwrap_err(),
        ] {
            assert!(matches!(
                err,
                RepoError::RecordNotFound { event_id, record_id }
                    if event_id == event.id && record_id == missing
            ));
        }
        assert!(matches!(
            repo.days_from_previous(event.id, missing, &Utc),
            Err(RepoError::RecordNotFound { .. })
        ));
    }
}
