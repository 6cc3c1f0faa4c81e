//! Domain model for research records.
//!
//! # Responsibility
//! - Define the flat, JSON-serializable records stored per collection.
//! - Own form-level field rules and the validation flag transition.
//!
//! # Invariants
//! - Every record is identified by a numeric `RecordId` unique in its
//!   collection.
//! - Editing a record never changes its id or creation timestamp.

pub mod config;
pub mod date;
pub mod form;
pub mod project;
pub mod publication;
pub mod record;
pub mod user;
pub mod validation;
