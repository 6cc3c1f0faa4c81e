//! Shared rules for owned work records (publications and projects).
//!
//! # Responsibility
//! - Define the error surface of the publication, project and validation
//!   services.
//! - Centralize the write guards: maintenance mode, owner existence and
//!   owner-or-admin edits.
//!
//! # Invariants
//! - Non-admin actors only ever see and touch records they own through
//!   `list_mine`, `update` and `delete`.
//! - Guards run before any collection is rewritten.

use crate::model::form::FormErrors;
use crate::model::record::{Collection, RecordId, WorkRecord};
use crate::model::user::{Actor, User};
use crate::model::validation::ValidationTransitionError;
use crate::repo::collection_repo::CollectionRepository;
use crate::repo::record_store::{RecordStore, RepoError};
use crate::search::filter::{filter_owned, FilterCriteria, FilterError, Filterable};
use crate::service::config_service::load_config;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum WorkServiceError {
    /// Draft failed form rules; every failing field is reported.
    Form(FormErrors),
    /// Target record does not exist.
    NotFound { collection: Collection, id: RecordId },
    /// Actor may not perform the operation.
    Forbidden(&'static str),
    /// Acting user is not a registered user.
    OwnerNotFound(RecordId),
    /// Maintenance mode blocks non-admin writes.
    MaintenanceMode,
    /// Validation flag was already decided.
    Validation(ValidationTransitionError),
    Filter(FilterError),
    Repo(RepoError),
}

impl Display for WorkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(errors) => write!(f, "{errors}"),
            Self::NotFound { collection, id } => write!(f, "{collection} record not found: {id}"),
            Self::Forbidden(reason) => write!(f, "forbidden: {reason}"),
            Self::OwnerNotFound(id) => write!(f, "acting user not found: {id}"),
            Self::MaintenanceMode => write!(f, "system is in maintenance mode"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Filter(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Filter(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { collection, id } => Self::NotFound { collection, id },
            other => Self::Repo(other),
        }
    }
}

impl From<FormErrors> for WorkServiceError {
    fn from(value: FormErrors) -> Self {
        Self::Form(value)
    }
}

impl From<FilterError> for WorkServiceError {
    fn from(value: FilterError) -> Self {
        Self::Filter(value)
    }
}

impl From<ValidationTransitionError> for WorkServiceError {
    fn from(value: ValidationTransitionError) -> Self {
        Self::Validation(value)
    }
}

pub type WorkResult<T> = Result<T, WorkServiceError>;

/// Rejects non-admin writes while maintenance mode is on.
pub(crate) fn ensure_writable<S: RecordStore>(store: &S, actor: &Actor) -> WorkResult<()> {
    if !actor.is_admin() && load_config(store)?.maintenance {
        return Err(WorkServiceError::MaintenanceMode);
    }
    Ok(())
}

/// The acting user must exist in the users collection.
pub(crate) fn ensure_registered<S: RecordStore>(store: &S, actor: &Actor) -> WorkResult<()> {
    let users = CollectionRepository::<S, User>::new(store);
    if users.get(actor.user_id)?.is_none() {
        return Err(WorkServiceError::OwnerNotFound(actor.user_id));
    }
    Ok(())
}

pub(crate) fn ensure_can_edit<T: WorkRecord>(actor: &Actor, record: &T) -> WorkResult<()> {
    if actor.is_admin() || record.owner_id() == actor.user_id {
        Ok(())
    } else {
        Err(WorkServiceError::Forbidden(
            "only the owner or an admin may change this record",
        ))
    }
}

/// Admins see every record; other actors only their own.
pub(crate) fn list_scoped<S, T>(
    store: &S,
    actor: &Actor,
    criteria: &FilterCriteria,
) -> WorkResult<Vec<T>>
where
    S: RecordStore,
    T: WorkRecord + Filterable,
{
    let mut records = store.load::<T>()?;
    if !actor.is_admin() {
        records.retain(|record| record.owner_id() == actor.user_id);
    }
    Ok(filter_owned(records, criteria)?)
}

pub(crate) fn list_all<S, T>(store: &S, criteria: &FilterCriteria) -> WorkResult<Vec<T>>
where
    S: RecordStore,
    T: WorkRecord + Filterable,
{
    Ok(filter_owned(store.load::<T>()?, criteria)?)
}

/// Removes a record after the write guards pass.
pub(crate) fn delete_owned<S, T>(store: &S, actor: &Actor, id: RecordId) -> WorkResult<T>
where
    S: RecordStore,
    T: WorkRecord,
{
    ensure_writable(store, actor)?;
    let removed = CollectionRepository::<S, T>::new(store).mutate(|records| {
        let index = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or(WorkServiceError::NotFound {
                collection: T::COLLECTION,
                id,
            })?;
        ensure_can_edit(actor, &records[index])?;
        Ok::<_, WorkServiceError>(records.remove(index))
    })?;
    info!(
        "event=record_delete module=service status=ok collection={} id={} actor_id={}",
        T::COLLECTION,
        id,
        actor.user_id
    );
    Ok(removed)
}
