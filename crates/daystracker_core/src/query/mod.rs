//! Stateless projections from repository state to view-ready shapes.
//!
//! # Responsibility
//! - Compute day counts (since latest, from previous record).
//! - Filter events by search text and assemble display rows.
//!
//! # Invariants
//! - Functions are pure and recompute from the given slice on every call.

pub mod days;
pub mod view;

pub use days::{days_from_previous, days_since_latest};
pub use view::{event_views, filtered_events, record_rows, EventView, RecordRow};
