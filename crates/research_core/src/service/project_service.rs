//! Project use-case service.
//!
//! # Invariants
//! - Form rules are checked against the owner's role, which is captured at
//!   creation and kept across edits, so an admin editing a student project
//!   sees student rules.
//! - Edits keep `id`, owner fields, `created_at` and `validation`.

use crate::model::project::{Project, ProjectDraft};
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

pub struct ProjectService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> ProjectService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn repo(&self) -> CollectionRepository<'_, S, Project> {
        CollectionRepository::new(&self.store)
    }

    pub fn create(&self, actor: &Actor, draft: ProjectDraft) -> WorkResult<Project> {
        ensure_writable(&self.store, actor)?;
        draft.validate(actor.role)?;
        ensure_registered(&self.store, actor)?;

        let now = now_epoch_ms();
        let project = self.repo().mutate(|records| {
            let id = next_record_id(records.iter().map(Record::id), now);
            let project = Project::from_draft(id, actor, draft, now);
            records.push(project.clone());
            Ok::<_, WorkServiceError>(project)
        })?;
        info!(
            "event=project_create module=service status=ok id={} owner_id={} type={}",
            project.id,
            project.owner_id,
            project.kind.as_str()
        );
        Ok(project)
    }

    pub fn update(&self, actor: &Actor, id: RecordId, draft: ProjectDraft) -> WorkResult<Project> {
        ensure_writable(&self.store, actor)?;
        let now = now_epoch_ms();

        let project = self.repo().mutate(|records| {
            let slot = find_slot(records, id)?;
            ensure_can_edit(actor, &*slot)?;
            draft.validate(slot.owner_role)?;
            slot.apply_draft(draft, now);
            Ok::<_, WorkServiceError>(slot.clone())
        })?;
        info!(
            "event=project_update module=service status=ok id={} actor_id={}",
            id, actor.user_id
        );
        Ok(project)
    }

    pub fn delete(&self, actor: &Actor, id: RecordId) -> WorkResult<Project> {
        delete_owned(&self.store, actor, id)
    }

    pub fn get(&self, id: RecordId) -> WorkResult<Option<Project>> {
        Ok(self.repo().get(id)?)
    }

    pub fn list_mine(&self, actor: &Actor, criteria: &FilterCriteria) -> WorkResult<Vec<Project>> {
        list_scoped(&self.store, actor, criteria)
    }

    pub fn explore(&self, criteria: &FilterCriteria) -> WorkResult<Vec<Project>> {
        list_all(&self.store, criteria)
    }
}
