//! Domain model for tracked events and their dated records.
//!
//! # Responsibility
//! - Define the canonical `Event` / `EventRecord` shapes used by core.
//! - Own title validation and record ordering rules.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID assigned at creation.
//! - Records are owned by exactly one event; deleting the event drops them.
//! - No ordering is persisted; display order is always recomputed.

pub mod event;
