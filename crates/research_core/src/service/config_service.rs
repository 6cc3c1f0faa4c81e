//! System configuration service.
//!
//! # Invariants
//! - A missing configuration document reads as `SystemConfig::default()`.
//! - Only admins may overwrite the document.

use crate::model::config::SystemConfig;
use crate::model::record::Collection;
use crate::model::user::Actor;
use crate::repo::record_store::{RecordStore, RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ConfigServiceError {
    /// Caller is not an admin.
    Forbidden,
    Repo(RepoError),
}

impl Display for ConfigServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden => write!(f, "only admins may change the system configuration"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Forbidden => None,
        }
    }
}

impl From<RepoError> for ConfigServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Reads the stored configuration or defaults.
pub fn load_config<S: RecordStore>(store: &S) -> RepoResult<SystemConfig> {
    Ok(store
        .load_document::<SystemConfig>(Collection::Config)?
        .unwrap_or_default())
}

pub struct ConfigService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> ConfigService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load_config(&self) -> RepoResult<SystemConfig> {
        load_config(&self.store)
    }

    /// Replaces the whole configuration document.
    pub fn update_config(
        &self,
        actor: &Actor,
        config: SystemConfig,
    ) -> Result<SystemConfig, ConfigServiceError> {
        if !actor.is_admin() {
            return Err(ConfigServiceError::Forbidden);
        }
        self.store.save_document(Collection::Config, &config)?;
        info!(
            "event=config_update module=service status=ok actor_id={} maintenance={} registration_open={}",
            actor.user_id, config.maintenance, config.registration_open
        );
        Ok(config)
    }
}
