//! Record identity and collection keys.

use crate::model::validation::ValidationFlag;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Numeric record identifier, allocated from epoch milliseconds.
pub type RecordId = i64;

/// Named persistence keys. Each key holds one whole JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Publications,
    Projects,
    Config,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Publications => "publications",
            Self::Projects => "projects",
            Self::Config => "config",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A flat record persisted as one element of a collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Collection the record type is stored under.
    const COLLECTION: Collection;

    fn id(&self) -> RecordId;
}

/// Owned research output (publication or project) carrying a validation flag.
pub trait WorkRecord: Record {
    fn owner_id(&self) -> RecordId;
    fn created_at(&self) -> i64;
    fn validation(&self) -> &ValidationFlag;
    fn validation_mut(&mut self) -> &mut ValidationFlag;
}

/// Returns current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Allocates an id that is at least `now_ms` and greater than every id in
/// `existing`.
pub fn next_record_id(existing: impl IntoIterator<Item = RecordId>, now_ms: i64) -> RecordId {
    let max_existing = existing.into_iter().max();
    match max_existing {
        Some(max) if max >= now_ms => max.saturating_add(1),
        _ => now_ms,
    }
}

/// Converts blank optional text into `None` and trims the rest.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{next_record_id, non_blank};

    #[test]
    fn next_id_uses_clock_when_collection_is_older() {
        assert_eq!(next_record_id([10, 20], 1_000), 1_000);
        assert_eq!(next_record_id([], 1_000), 1_000);
    }

    #[test]
    fn next_id_never_collides_within_same_millisecond() {
        assert_eq!(next_record_id([1_000], 1_000), 1_001);
        assert_eq!(next_record_id([1_000, 1_005], 1_002), 1_006);
    }

    #[test]
    fn non_blank_drops_whitespace_only_values() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" x ".to_string())).as_deref(), Some("x"));
        assert_eq!(non_blank(None), None);
    }
}
