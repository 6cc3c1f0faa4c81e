//! User use-case service.
//!
//! # Responsibility
//! - Self-registration and admin user management.
//! - Self-service profile edits and user listings.
//!
//! # Invariants
//! - Email (case-insensitive) and national id are unique across users.
//! - Self-registration never creates admins.
//! - Edits keep `id` and `registered_at`.
//! - Deleting a user leaves their publications and projects in place.

use crate::model::form::FormErrors;
use crate::model::project::Project;
use crate::model::publication::Publication;
use crate::model::record::{next_record_id, now_epoch_ms, Record, RecordId, WorkRecord};
use crate::model::user::{normalize_email, Actor, ProfilePatch, Role, User, UserDraft};
use crate::repo::collection_repo::{find_slot, CollectionRepository};
use crate::repo::record_store::{RecordStore, RepoError};
use crate::search::filter::{filter_owned, FilterCriteria, FilterError};
use crate::service::config_service::load_config;
use log::info;
use std::cmp::Reverse;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum UserServiceError {
    Form(FormErrors),
    /// Another user already holds this email.
    EmailTaken(String),
    /// Another user already holds this national id.
    NationalIdTaken(String),
    /// Self-registration is switched off.
    RegistrationClosed,
    Forbidden(&'static str),
    UserNotFound(RecordId),
    MaintenanceMode,
    Filter(FilterError),
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(errors) => write!(f, "{errors}"),
            Self::EmailTaken(email) => write!(f, "email already registered: `{email}`"),
            Self::NationalIdTaken(id) => write!(f, "national id already registered: `{id}`"),
            Self::RegistrationClosed => write!(f, "registration is closed"),
            Self::Forbidden(reason) => write!(f, "forbidden: {reason}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::MaintenanceMode => write!(f, "system is in maintenance mode"),
            Self::Filter(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Filter(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<FormErrors> for UserServiceError {
    fn from(value: FormErrors) -> Self {
        Self::Form(value)
    }
}

impl From<FilterError> for UserServiceError {
    fn from(value: FilterError) -> Self {
        Self::Filter(value)
    }
}

pub type UserResult<T> = Result<T, UserServiceError>;

/// One row of the researcher directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub user: User,
    pub publications: usize,
    pub projects: usize,
    /// Titles of the user's latest publications, newest first.
    pub recent_publications: Vec<String>,
    /// Names of the user's latest projects, newest first.
    pub recent_projects: Vec<String>,
}

const RECENT_ITEMS: usize = 3;

pub struct UserService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn repo(&self) -> CollectionRepository<'_, S, User> {
        CollectionRepository::new(&self.store)
    }

    /// Self-registration.
    ///
    /// # Errors
    /// - `RegistrationClosed` when the configuration disallows it.
    /// - `Forbidden` for an admin role.
    /// - `Form`, `EmailTaken`, `NationalIdTaken` on bad input.
    pub fn register(&self, draft: UserDraft) -> UserResult<User> {
        let config = load_config(&self.store)?;
        if !config.registration_open {
            return Err(UserServiceError::RegistrationClosed);
        }
        if draft.role == Role::Admin {
            return Err(UserServiceError::Forbidden(
                "admins cannot be created through registration",
            ));
        }
        draft.validate(&config.institutional_domains)?;
        let user = self.insert(draft)?;
        info!(
            "event=user_register module=service status=ok id={} role={}",
            user.id, user.role
        );
        Ok(user)
    }

    /// Admin creation of a user with any role.
    pub fn create_user(&self, actor: &Actor, draft: UserDraft) -> UserResult<User> {
        ensure_admin(actor)?;
        let config = load_config(&self.store)?;
        draft.validate(&config.institutional_domains)?;
        let user = self.insert(draft)?;
        info!(
            "event=user_create module=service status=ok id={} role={} actor_id={}",
            user.id, user.role, actor.user_id
        );
        Ok(user)
    }

    fn insert(&self, draft: UserDraft) -> UserResult<User> {
        let now = now_epoch_ms();
        self.repo().mutate(|users| {
            ensure_unique(users, None, &draft)?;
            let id = next_record_id(users.iter().map(Record::id), now);
            let user = User::from_draft(id, draft, now);
            users.push(user.clone());
            Ok(user)
        })
    }

    /// Admin edit of identity fields and role.
    pub fn update_user(&self, actor: &Actor, id: RecordId, draft: UserDraft) -> UserResult<User> {
        ensure_admin(actor)?;
        let config = load_config(&self.store)?;
        draft.validate(&config.institutional_domains)?;
        let now = now_epoch_ms();
        let user = self.repo().mutate(|users| {
            ensure_unique(users, Some(id), &draft)?;
            let slot = find_slot(users, id)?;
            slot.apply_draft(draft, now);
            Ok::<_, UserServiceError>(slot.clone())
        })?;
        info!(
            "event=user_update module=service status=ok id={} actor_id={}",
            id, actor.user_id
        );
        Ok(user)
    }

    /// Removes the user. Their records stay and keep the stored owner name.
    pub fn delete_user(&self, actor: &Actor, id: RecordId) -> UserResult<User> {
        ensure_admin(actor)?;
        let removed = self.repo().remove(id)?;
        info!(
            "event=user_delete module=service status=ok id={} actor_id={}",
            id, actor.user_id
        );
        Ok(removed)
    }

    pub fn set_active(&self, actor: &Actor, id: RecordId, active: bool) -> UserResult<User> {
        ensure_admin(actor)?;
        let now = now_epoch_ms();
        let user = self.repo().mutate(|users| {
            let slot = find_slot(users, id)?;
            slot.active = active;
            slot.updated_at = now;
            Ok::<_, UserServiceError>(slot.clone())
        })?;
        info!(
            "event=user_set_active module=service status=ok id={} active={} actor_id={}",
            id, active, actor.user_id
        );
        Ok(user)
    }

    /// Applies a profile patch to the actor's own account.
    pub fn update_profile(&self, actor: &Actor, patch: ProfilePatch) -> UserResult<User> {
        let config = load_config(&self.store)?;
        if config.maintenance && !actor.is_admin() {
            return Err(UserServiceError::MaintenanceMode);
        }
        let now = now_epoch_ms();
        let user = self.repo().mutate(|users| {
            let slot = find_slot(users, actor.user_id)?;
            let mut edited = slot.clone();
            edited.apply_profile(patch, now);
            edited.validate(&config.institutional_domains)?;
            *slot = edited.clone();
            Ok::<_, UserServiceError>(edited)
        })?;
        info!(
            "event=profile_update module=service status=ok id={}",
            actor.user_id
        );
        Ok(user)
    }

    pub fn get_user(&self, id: RecordId) -> UserResult<Option<User>> {
        Ok(self.repo().get(id)?)
    }

    /// Case-insensitive email lookup.
    pub fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .repo()
            .list()?
            .into_iter()
            .find(|user| user.email == email))
    }

    pub fn list_users(&self, criteria: &FilterCriteria) -> UserResult<Vec<User>> {
        Ok(filter_owned(self.repo().list()?, criteria)?)
    }

    /// Active researchers matching `criteria`, with their output.
    pub fn researcher_directory(
        &self,
        criteria: &FilterCriteria,
    ) -> UserResult<Vec<DirectoryEntry>> {
        self.directory(Role::Researcher, criteria)
    }

    /// Active users with `role` matching `criteria`, each with output
    /// counts and their latest publication and project titles.
    pub fn directory(
        &self,
        role: Role,
        criteria: &FilterCriteria,
    ) -> UserResult<Vec<DirectoryEntry>> {
        let mut users = self.repo().list()?;
        users.retain(|user| user.active && user.role == role);
        let users = filter_owned(users, criteria)?;
        let publications = self.store.load::<Publication>()?;
        let projects = self.store.load::<Project>()?;

        Ok(users
            .into_iter()
            .map(|user| {
                let own_publications = owned_by(&publications, user.id);
                let own_projects = owned_by(&projects, user.id);
                DirectoryEntry {
                    publications: own_publications.len(),
                    projects: own_projects.len(),
                    recent_publications: latest(own_publications)
                        .into_iter()
                        .map(|publication| publication.title.clone())
                        .collect(),
                    recent_projects: latest(own_projects)
                        .into_iter()
                        .map(|project| project.name.clone())
                        .collect(),
                    user,
                }
            })
            .collect())
    }
}

fn owned_by<T: WorkRecord>(records: &[T], owner_id: RecordId) -> Vec<&T> {
    records
        .iter()
        .filter(|record| record.owner_id() == owner_id)
        .collect()
}

/// Newest first by creation time; among equal times the later-stored
/// record comes first.
fn latest<T: WorkRecord>(mut owned: Vec<&T>) -> Vec<&T> {
    owned.reverse();
    owned.sort_by_key(|record| Reverse(record.created_at()));
    owned.truncate(RECENT_ITEMS);
    owned
}

fn ensure_admin(actor: &Actor) -> UserResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(UserServiceError::Forbidden("only admins may manage users"))
    }
}

/// Rejects a draft whose email or national id belongs to another user.
fn ensure_unique(users: &[User], except: Option<RecordId>, draft: &UserDraft) -> UserResult<()> {
    let email = normalize_email(&draft.email);
    let national_id = draft.national_id.trim();
    let others = users.iter().filter(|user| Some(user.id) != except);
    for user in others {
        if user.email == email {
            return Err(UserServiceError::EmailTaken(email));
        }
        if user.national_id == national_id {
            return Err(UserServiceError::NationalIdTaken(national_id.to_string()));
        }
    }
    Ok(())
}
