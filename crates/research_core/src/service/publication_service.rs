//! Publication use-case service.
//!
//! # Responsibility
//! - Create, edit, delete and list publications on behalf of an actor.
//! - Apply publication form rules before any write.
//!
//! # Invariants
//! - New publications start with an unset validation flag.
//! - Edits keep `id`, owner fields, `created_at` and `validation`.

use crate::model::date::CalendarDate;
use crate::model::publication::{Publication, PublicationDraft};
use crate::model::record::{next_record_id, now_epoch_ms, Record, RecordId};
use crate::model::user::Actor;
use crate::repo::collection_repo::{find_slot, CollectionRepository};
use crate::repo::record_store::RecordStore;
use crate::search::filter::FilterCriteria;
use crate::service::work::{
    delete_owned, ensure_can_edit, ensure_registered, ensure_writable, list_all, list_scoped,
    WorkResult, WorkServiceError,
};
use log::info;

pub struct PublicationService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> PublicationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn repo(&self) -> CollectionRepository<'_, S, Publication> {
        CollectionRepository::new(&self.store)
    }

    /// Creates a publication owned by `actor`.
    ///
    /// # Errors
    /// - `MaintenanceMode` for non-admins while maintenance is on.
    /// - `Form` when the draft breaks publication rules.
    /// - `OwnerNotFound` when `actor` is not a registered user.
    pub fn create(&self, actor: &Actor, draft: PublicationDraft) -> WorkResult<Publication> {
        ensure_writable(&self.store, actor)?;
        let now = now_epoch_ms();
        draft.validate(CalendarDate::from_epoch_ms(now).year())?;
        ensure_registered(&self.store, actor)?;

        let publication = self.repo().mutate(|records| {
            let id = next_record_id(records.iter().map(Record::id), now);
            let publication = Publication::from_draft(id, actor, draft, now);
            records.push(publication.clone());
            Ok::<_, WorkServiceError>(publication)
        })?;
        info!(
            "event=publication_create module=service status=ok id={} owner_id={}",
            publication.id, publication.owner_id
        );
        Ok(publication)
    }

    /// Replaces the content of an existing publication in place.
    pub fn update(
        &self,
        actor: &Actor,
        id: RecordId,
        draft: PublicationDraft,
    ) -> WorkResult<Publication> {
        ensure_writable(&self.store, actor)?;
        let now = now_epoch_ms();
        draft.validate(CalendarDate::from_epoch_ms(now).year())?;

        let publication = self.repo().mutate(|records| {
            let slot = find_slot(records, id)?;
            ensure_can_edit(actor, &*slot)?;
            slot.apply_draft(draft, now);
            Ok::<_, WorkServiceError>(slot.clone())
        })?;
        info!(
            "event=publication_update module=service status=ok id={} actor_id={}",
            id, actor.user_id
        );
        Ok(publication)
    }

    pub fn delete(&self, actor: &Actor, id: RecordId) -> WorkResult<Publication> {
        delete_owned(&self.store, actor, id)
    }

    pub fn get(&self, id: RecordId) -> WorkResult<Option<Publication>> {
        Ok(self.repo().get(id)?)
    }

    /// Publications visible in the actor's own list, filtered.
    pub fn list_mine(
        &self,
        actor: &Actor,
        criteria: &FilterCriteria,
    ) -> WorkResult<Vec<Publication>> {
        list_scoped(&self.store, actor, criteria)
    }

    /// Every publication, filtered.
    pub fn explore(&self, criteria: &FilterCriteria) -> WorkResult<Vec<Publication>> {
        list_all(&self.store, criteria)
    }
}
