//! Validation flag attached to publications and projects.
//!
//! # Responsibility
//! - Model the tri-state approval marker (`unset`, validated, rejected).
//! - Own the one-way transition out of `unset`.
//!
//! # Invariants
//! - `Validated` and `Rejected` are terminal; no path leads back to `Unset`.
//! - A decided flag always carries the deciding actor and timestamp.

use crate::model::record::RecordId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Who decided and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStamp {
    pub actor_id: RecordId,
    pub actor_name: String,
    /// Epoch milliseconds.
    pub decided_at: i64,
}

/// Serialized as `{"status": "unset"}` or
/// `{"status": "validated", "actor_id": .., "actor_name": .., "decided_at": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationFlag {
    #[default]
    Unset,
    Validated(ValidationStamp),
    Rejected(ValidationStamp),
}

/// Admin verdict applied to an unset flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Validate,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationTransitionError {
    /// The flag was already decided; carries the current status.
    AlreadyDecided(&'static str),
}

impl Display for ValidationTransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyDecided(status) => {
                write!(f, "validation already decided as `{status}`")
            }
        }
    }
}

impl Error for ValidationTransitionError {}

impl ValidationFlag {
    /// Stable snake_case status name, as used on the wire.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Validated(_) => "validated",
            Self::Rejected(_) => "rejected",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_validated(&self) -> bool {
        matches!(self, Self::Validated(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn stamp(&self) -> Option<&ValidationStamp> {
        match self {
            Self::Unset => None,
            Self::Validated(stamp) | Self::Rejected(stamp) => Some(stamp),
        }
    }

    /// Moves an unset flag into its terminal state.
    ///
    /// # Errors
    /// - `AlreadyDecided` when the flag is not `Unset`; the flag is untouched.
    pub fn decide(
        &mut self,
        decision: Decision,
        stamp: ValidationStamp,
    ) -> Result<(), ValidationTransitionError> {
        if !self.is_unset() {
            return Err(ValidationTransitionError::AlreadyDecided(self.status()));
        }
        *self = match decision {
            Decision::Validate => Self::Validated(stamp),
            Decision::Reject => Self::Rejected(stamp),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Decision, ValidationFlag, ValidationStamp, ValidationTransitionError};

    fn stamp(at: i64) -> ValidationStamp {
        ValidationStamp {
            actor_id: 1,
            actor_name: "Admin".to_string(),
            decided_at: at,
        }
    }

    #[test]
    fn decide_moves_unset_to_terminal_state() {
        let mut flag = ValidationFlag::default();
        flag.decide(Decision::Reject, stamp(5)).unwrap();
        assert!(flag.is_rejected());
        assert_eq!(flag.stamp().unwrap().decided_at, 5);
    }

    #[test]
    fn decided_flag_is_never_reopened() {
        let mut flag = ValidationFlag::default();
        flag.decide(Decision::Validate, stamp(5)).unwrap();

        let err = flag.decide(Decision::Reject, stamp(9)).unwrap_err();
        assert_eq!(err, ValidationTransitionError::AlreadyDecided("validated"));
        assert!(flag.is_validated());
        assert_eq!(flag.stamp().unwrap().decided_at, 5);
    }

    #[test]
    fn wire_format_is_internally_tagged() {
        let json = serde_json::to_value(ValidationFlag::Unset).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "unset" }));

        let decided = ValidationFlag::Validated(stamp(7));
        let json = serde_json::to_value(&decided).unwrap();
        assert_eq!(json["status"], "validated");
        assert_eq!(json["actor_name"], "Admin");
        assert_eq!(json["decided_at"], 7);
    }
}
