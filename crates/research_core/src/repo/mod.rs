//! Repository layer: named JSON collections over SQLite.
//!
//! # Responsibility
//! - Define the whole-collection load/save contract (`RecordStore`).
//! - Provide typed read-modify-write helpers per record type.
//!
//! # Invariants
//! - Every mutation rewrites the entire collection; there are no partial
//!   writes.
//! - A missing collection key reads as an empty collection.
//! - Persisted payloads that fail to decode surface as `InvalidData`
//!   instead of being silently dropped.

pub mod collection_repo;
pub mod record_store;
