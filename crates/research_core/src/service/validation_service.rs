//! Admin validation of publications and projects.
//!
//! # Responsibility
//! - Expose the queue of records awaiting a decision.
//! - Record validate/reject decisions with the deciding admin and time.
//!
//! # Invariants
//! - Only admins decide.
//! - A decided flag is terminal; a second decision fails with
//!   `AlreadyDecided` and the stored record is left as it was.

use crate::model::project::Project;
use crate::model::publication::Publication;
use crate::model::record::{now_epoch_ms, RecordId, WorkRecord};
use crate::model::user::Actor;
use crate::model::validation::{Decision, ValidationStamp};
use crate::repo::collection_repo::{find_slot, CollectionRepository};
use crate::repo::record_store::RecordStore;
use crate::service::work::{WorkResult, WorkServiceError};
use log::{info, warn};

/// Records still waiting for an admin decision.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQueue {
    pub publications: Vec<Publication>,
    pub projects: Vec<Project>,
}

impl PendingQueue {
    pub fn len(&self) -> usize {
        self.publications.len() + self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct ValidationService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> ValidationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Unset-flag records in stored order.
    pub fn pending(&self) -> WorkResult<PendingQueue> {
        Ok(PendingQueue {
            publications: self.pending_of::<Publication>()?,
            projects: self.pending_of::<Project>()?,
        })
    }

    fn pending_of<T: WorkRecord>(&self) -> WorkResult<Vec<T>> {
        let mut records = self.store.load::<T>()?;
        records.retain(|record| record.validation().is_unset());
        Ok(records)
    }

    pub fn decide_publication(
        &self,
        actor: &Actor,
        id: RecordId,
        decision: Decision,
    ) -> WorkResult<Publication> {
        self.decide::<Publication>(actor, id, decision)
    }

    pub fn decide_project(
        &self,
        actor: &Actor,
        id: RecordId,
        decision: Decision,
    ) -> WorkResult<Project> {
        self.decide::<Project>(actor, id, decision)
    }

    /// Applies `decision` to the record with `id` and persists it.
    pub fn decide<T: WorkRecord>(
        &self,
        actor: &Actor,
        id: RecordId,
        decision: Decision,
    ) -> WorkResult<T> {
        if !actor.is_admin() {
            return Err(WorkServiceError::Forbidden("only admins may validate records"));
        }
        let stamp = ValidationStamp {
            actor_id: actor.user_id,
            actor_name: actor.display_name.clone(),
            decided_at: now_epoch_ms(),
        };

        let outcome = CollectionRepository::<S, T>::new(&self.store).mutate(|records| {
            let slot = find_slot(records, id)?;
            slot.validation_mut().decide(decision, stamp)?;
            Ok::<_, WorkServiceError>(slot.clone())
        });
        match &outcome {
            Ok(record) => info!(
                "event=validation_decide module=service status=ok collection={} id={} decision={}",
                T::COLLECTION,
                id,
                record.validation().status()
            ),
            Err(err) => warn!(
                "event=validation_decide module=service status=error collection={} id={} error={}",
                T::COLLECTION,
                id,
                err
            ),
        }
        outcome
    }
}
