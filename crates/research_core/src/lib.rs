//! Core domain logic for the research records registry.
//! This crate is the single source of truth for record rules, filtering
//! and validation decisions.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::config::SystemConfig;
pub use model::date::CalendarDate;
pub use model::form::FormErrors;
pub use model::project::{Project, ProjectDraft, ProjectStatus, ProjectType};
pub use model::publication::{Publication, PublicationDraft, PublicationType};
pub use model::record::{Collection, Record, RecordId, WorkRecord};
pub use model::user::{Actor, ProfilePatch, Role, User, UserDraft};
pub use model::validation::{Decision, ValidationFlag, ValidationStamp};
pub use repo::collection_repo::CollectionRepository;
pub use repo::record_store::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use search::filter::{
    filter_owned, filter_records, Criterion, FilterCriteria, FilterError, Filterable,
};
pub use service::backup_service::{BackupBlob, BackupError, BackupService, ImportSummary};
pub use service::config_service::{ConfigService, ConfigServiceError};
pub use service::project_service::ProjectService;
pub use service::publication_service::PublicationService;
pub use service::report_service::{ProfileStats, ReportService, SystemReport};
pub use service::user_service::{DirectoryEntry, UserService, UserServiceError};
pub use service::validation_service::{PendingQueue, ValidationService};
pub use service::work::{WorkResult, WorkServiceError};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
