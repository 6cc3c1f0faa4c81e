//! Typed collection repository.
//!
//! # Responsibility
//! - Offer CRUD over one record type on top of a `RecordStore`.
//! - Express every write as load, mutate in memory, save whole collection.
//!
//! # Invariants
//! - `replace` keeps the record at its original position.
//! - A failed mutation closure leaves the stored collection untouched.

use crate::model::record::{Record, RecordId};
use crate::repo::record_store::{RecordStore, RepoError, RepoResult};
use std::marker::PhantomData;

/// CRUD view over the collection of `T`.
pub struct CollectionRepository<'s, S: RecordStore, T: Record> {
    store: &'s S,
    _record: PhantomData<T>,
}

impl<'s, S: RecordStore, T: Record> CollectionRepository<'s, S, T> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn list(&self) -> RepoResult<Vec<T>> {
        self.store.load::<T>()
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<T>> {
        Ok(self.list()?.into_iter().find(|record| record.id() == id))
    }

    /// Loads the collection, applies `f`, and saves only when `f` succeeds.
    pub fn mutate<R, E>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R, E>) -> Result<R, E>
    where
        E: From<RepoError>,
    {
        let mut records = self.list()?;
        let outcome = f(&mut records)?;
        self.store.save(&records)?;
        Ok(outcome)
    }

    /// Appends `record`; rejects an id already present.
    pub fn insert(&self, record: T) -> RepoResult<T> {
        self.mutate(|records| {
            if records.iter().any(|existing| existing.id() == record.id()) {
                return Err(RepoError::DuplicateId {
                    collection: T::COLLECTION,
                    id: record.id(),
                });
            }
            records.push(record.clone());
            Ok(record)
        })
    }

    /// Overwrites the record with the same id, in place.
    pub fn replace(&self, record: T) -> RepoResult<()> {
        self.mutate(|records| {
            let slot = find_slot(records, record.id())?;
            *slot = record;
            Ok(())
        })
    }

    /// Removes and returns the record with `id`.
    pub fn remove(&self, id: RecordId) -> RepoResult<T> {
        self.mutate(|records| {
            let index = records
                .iter()
                .position(|record| record.id() == id)
                .ok_or(RepoError::NotFound {
                    collection: T::COLLECTION,
                    id,
                })?;
            Ok(records.remove(index))
        })
    }
}

/// Returns a mutable reference to the record with `id`.
pub fn find_slot<T: Record>(records: &mut [T], id: RecordId) -> RepoResult<&mut T> {
    records
        .iter_mut()
        .find(|record| record.id() == id)
        .ok_or(RepoError::NotFound {
            collection: T::COLLECTION,
            id,
        })
}
