//! Backup export/import of the record collections.
//!
//! # Responsibility
//! - Export users, publications and projects as one JSON document.
//! - Restore all three collections from such a document in one write.
//! - Clear the three collections.
//!
//! # Invariants
//! - Import parses the whole document before writing; a parse failure
//!   leaves storage untouched.
//! - Arrays missing from an imported document restore as empty.
//! - The configuration document is neither exported nor cleared.

use crate::model::project::Project;
use crate::model::publication::Publication;
use crate::model::record::{now_epoch_ms, Collection, Record};
use crate::model::user::{Actor, User};
use crate::repo::record_store::{encode, RecordStore, RepoError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum BackupError {
    /// Caller is not an admin.
    Forbidden,
    /// Backup text is not a valid backup document.
    Parse(serde_json::Error),
    /// Snapshot could not be written as JSON.
    Serialize(serde_json::Error),
    Repo(RepoError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden => write!(f, "only admins may export, import or clear data"),
            Self::Parse(err) => write!(f, "invalid backup document: {err}"),
            Self::Serialize(err) => write!(f, "failed to write backup document: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Forbidden => None,
            Self::Parse(err) | Self::Serialize(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for BackupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Full snapshot of the record collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupBlob {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub exported_at: i64,
}

impl BackupBlob {
    /// Pretty-printed JSON text of the snapshot.
    pub fn to_json(&self) -> Result<String, BackupError> {
        serde_json::to_string_pretty(self).map_err(BackupError::Serialize)
    }

    pub fn from_json(text: &str) -> Result<Self, BackupError> {
        serde_json::from_str(text).map_err(BackupError::Parse)
    }
}

/// Record counts restored by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub users: usize,
    pub publications: usize,
    pub projects: usize,
}

pub struct BackupService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> BackupService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn export_backup(&self, actor: &Actor) -> Result<BackupBlob, BackupError> {
        ensure_admin(actor)?;
        let blob = BackupBlob {
            users: self.store.load()?,
            publications: self.store.load()?,
            projects: self.store.load()?,
            exported_at: now_epoch_ms(),
        };
        info!(
            "event=backup_export module=service status=ok users={} publications={} projects={}",
            blob.users.len(),
            blob.publications.len(),
            blob.projects.len()
        );
        Ok(blob)
    }

    /// Replaces the three collections with the contents of `text`.
    pub fn import_backup(&self, actor: &Actor, text: &str) -> Result<ImportSummary, BackupError> {
        ensure_admin(actor)?;
        let blob = match BackupBlob::from_json(text) {
            Ok(blob) => blob,
            Err(err) => {
                warn!("event=backup_import module=service status=error error_kind=parse");
                return Err(err);
            }
        };
        self.restore(&blob)?;
        let summary = ImportSummary {
            users: blob.users.len(),
            publications: blob.publications.len(),
            projects: blob.projects.len(),
        };
        info!(
            "event=backup_import module=service status=ok users={} publications={} projects={}",
            summary.users, summary.publications, summary.projects
        );
        Ok(summary)
    }

    fn restore(&self, blob: &BackupBlob) -> Result<(), BackupError> {
        let entries = [
            (User::COLLECTION, encode(User::COLLECTION, &blob.users)?),
            (
                Publication::COLLECTION,
                encode(Publication::COLLECTION, &blob.publications)?,
            ),
            (
                Project::COLLECTION,
                encode(Project::COLLECTION, &blob.projects)?,
            ),
        ];
        self.store.save_raw_batch(&entries)?;
        Ok(())
    }

    /// Removes users, publications and projects.
    pub fn clear_all(&self, actor: &Actor) -> Result<(), BackupError> {
        ensure_admin(actor)?;
        self.store.clear(&[
            Collection::Users,
            Collection::Publications,
            Collection::Projects,
        ])?;
        info!(
            "event=data_clear module=service status=ok actor_id={}",
            actor.user_id
        );
        Ok(())
    }
}

fn ensure_admin(actor: &Actor) -> Result<(), BackupError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(BackupError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::BackupError;
    use serde::ser::Error as _;

    #[test]
    fn write_failures_are_not_reported_as_bad_input() {
        let err = BackupError::Serialize(serde_json::Error::custom("key must be a string"));
        assert_eq!(
            err.to_string(),
            "failed to write backup document: key must be a string"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
