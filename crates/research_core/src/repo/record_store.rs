//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist one JSON document per `Collection` key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save_*` replaces the stored document for the key in full.
//! - Batch saves and clears commit all keys or none.

use crate::db::DbError;
use crate::model::record::{now_epoch_ms, Collection, Record, RecordId};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for collection persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A collection could not be encoded as JSON.
    Serialization {
        collection: Collection,
        source: serde_json::Error,
    },
    /// Persisted payload does not decode into the expected shape.
    InvalidData {
        collection: Collection,
        message: String,
    },
    NotFound {
        collection: Collection,
        id: RecordId,
    },
    DuplicateId {
        collection: Collection,
        id: RecordId,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization { collection, source } => {
                write!(f, "failed to encode collection `{collection}`: {source}")
            }
            Self::InvalidData {
                collection,
                message,
            } => write!(f, "invalid persisted data in `{collection}`: {message}"),
            Self::NotFound { collection, id } => {
                write!(f, "record {id} not found in `{collection}`")
            }
            Self::DuplicateId { collection, id } => {
                write!(f, "record {id} already exists in `{collection}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization { source, .. } => Some(source),
            Self::InvalidData { .. } | Self::NotFound { .. } | Self::DuplicateId { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-document key-value persistence.
///
/// Implementors only move raw JSON text; the provided methods handle
/// encoding and decoding.
pub trait RecordStore {
    /// Returns the stored payload for `collection`, if any.
    fn load_raw(&self, collection: Collection) -> RepoResult<Option<String>>;

    /// Replaces the stored payload for `collection`.
    fn save_raw(&self, collection: Collection, payload: &str) -> RepoResult<()>;

    /// Replaces several payloads at once, all or nothing.
    fn save_raw_batch(&self, entries: &[(Collection, String)]) -> RepoResult<()>;

    /// Removes the keys, all or nothing; later loads see empty collections.
    fn clear(&self, collections: &[Collection]) -> RepoResult<()>;

    /// Loads every record of type `T`, in stored order.
    fn load<T: Record>(&self) -> RepoResult<Vec<T>>
    where
        Self: Sized,
    {
        Ok(self.load_document(T::COLLECTION)?.unwrap_or_default())
    }

    /// Overwrites the whole collection of `T`.
    fn save<T: Record>(&self, records: &[T]) -> RepoResult<()>
    where
        Self: Sized,
    {
        self.save_document(T::COLLECTION, records)
    }

    fn load_document<D: DeserializeOwned>(&self, collection: Collection) -> RepoResult<Option<D>>
    where
        Self: Sized,
    {
        let Some(payload) = self.load_raw(collection)? else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|err| RepoError::InvalidData {
                collection,
                message: err.to_string(),
            })
    }

    fn save_document<D: Serialize + ?Sized>(
        &self,
        collection: Collection,
        document: &D,
    ) -> RepoResult<()>
    where
        Self: Sized,
    {
        let payload = encode(collection, document)?;
        self.save_raw(collection, &payload)
    }
}

/// Encodes a document for `collection` as compact JSON.
pub fn encode<D: Serialize + ?Sized>(collection: Collection, document: &D) -> RepoResult<String> {
    serde_json::to_string(document)
        .map_err(|source| RepoError::Serialization { collection, source })
}

/// SQLite-backed record store over the `collections` table.
#[derive(Clone, Copy)]
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn load_raw(&self, collection: Collection) -> RepoResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE name = ?1;",
                [collection.key()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        debug!(
            "event=collection_load module=repo collection={} found={}",
            collection,
            payload.is_some()
        );
        Ok(payload)
    }

    fn save_raw(&self, collection: Collection, payload: &str) -> RepoResult<()> {
        upsert(self.conn, collection, payload)?;
        debug!(
            "event=collection_save module=repo collection={} bytes={}",
            collection,
            payload.len()
        );
        Ok(())
    }

    fn save_raw_batch(&self, entries: &[(Collection, String)]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (collection, payload) in entries {
            upsert(&tx, *collection, payload)?;
        }
        tx.commit()?;
        debug!(
            "event=collection_save_batch module=repo collections={}",
            entries.len()
        );
        Ok(())
    }

    fn clear(&self, collections: &[Collection]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for collection in collections {
            tx.execute(
                "DELETE FROM collections WHERE name = ?1;",
                [collection.key()],
            )?;
        }
        tx.commit()?;
        debug!(
            "event=collection_clear module=repo collections={}",
            collections.len()
        );
        Ok(())
    }
}

fn upsert(conn: &Connection, collection: Collection, payload: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO collections (name, payload, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(name) DO UPDATE SET
            payload = excluded.payload,
            updated_at = excluded.updated_at;",
        params![collection.key(), payload, now_epoch_ms()],
    )
}
