//! Registry database: one SQLite file holding the `collections` table.
//!
//! Every collection (users, publications, projects, config) is a single
//! JSON payload row keyed by name. This module owns opening that file and
//! bringing its schema up to date; the row format belongs to `repo`.
//!
//! # Invariants
//! - `PRAGMA user_version` is the schema version of the file.
//! - A file written by a newer registry build is refused, never downgraded.
//! - Nothing touches `collections` until `open_db`/`open_db_in_memory`
//!   has returned.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the registry database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file's schema is ahead of the migrations this build ships.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "registry database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "registry file uses schema v{db_version} but this build only knows up to v{latest_supported}; upgrade before opening it"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn newer_schema_message_names_both_versions() {
        let err = DbError::UnsupportedSchemaVersion {
            db_version: 3,
            latest_supported: 1,
        };
        let message = err.to_string();
        assert!(message.contains("schema v3"));
        assert!(message.contains("up to v1"));
        assert!(err.source().is_none());
    }

    #[test]
    fn sqlite_errors_keep_their_source() {
        let err = DbError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().starts_with("registry database error:"));
        assert!(err.source().is_some());
    }
}
