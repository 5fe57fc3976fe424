//! In-memory event repository with write-through snapshot persistence.
//!
//! # Responsibility
//! - Own the event collection and every mutation applied to it.
//! - Persist the full collection after each successful mutation.
//!
//! # Invariants
//! - Lookups are by id only; positional indices never leave the repository.
//! - A failed mutation (validation, lookup or save) leaves state untouched.

pub mod event_repo;
