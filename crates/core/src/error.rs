//! Ledger error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the ledger layer.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// The id-addressed tables an operation can fail to find a record in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Applicant,
    Application,
    Scholarship,
    Institution,
    Disbursement,
    AcademicRecord,
    Milestone,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Applicant => "applicant",
            EntityKind::Application => "application",
            EntityKind::Scholarship => "scholarship",
            EntityKind::Institution => "institution",
            EntityKind::Disbursement => "disbursement",
            EntityKind::AcademicRecord => "academic record",
            EntityKind::Milestone => "milestone",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger-level error.
///
/// This is a closed taxonomy. Each kind maps to a stable integer code that
/// hosts present to end users; codes are scoped per sub-ledger, so the same
/// number can mean different things in different tables (see [`LedgerError::code`]).
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LedgerError {
    /// The caller does not satisfy the operation's authorization mode.
    #[error("not authorized")]
    NotAuthorized,

    /// An id-addressed record does not exist.
    #[error("{0} not found")]
    NotFound(EntityKind),

    /// The applicant has already been verified.
    #[error("applicant already verified")]
    AlreadyVerified,

    /// Scholarship amounts are inconsistent (total < award) or overflow.
    #[error("invalid amount")]
    InvalidAmount,
}

impl LedgerError {
    pub const NOT_AUTHORIZED: u32 = 100;

    pub fn not_found(kind: EntityKind) -> Self {
        Self::NotFound(kind)
    }

    /// Stable numeric code for this error.
    pub fn code(&self) -> u32 {
        match self {
            LedgerError::NotAuthorized => Self::NOT_AUTHORIZED,
            LedgerError::NotFound(kind) => match kind {
                EntityKind::Applicant => 101,
                EntityKind::Application => 102,
                EntityKind::Scholarship => 102,
                EntityKind::Institution => 101,
                EntityKind::Disbursement => 102,
                EntityKind::AcademicRecord => 101,
                EntityKind::Milestone => 102,
            },
            LedgerError::AlreadyVerified => 103,
            LedgerError::InvalidAmount => 101,
        }
    }
}

/// A recorded event that cannot be applied to the current state.
///
/// Raised when rebuilding a sub-ledger from a journal: every event must be
/// one the sub-ledger itself could have decided at that point.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventConflict {
    /// A creation event names an id other than the table's next id.
    #[error("{kind} id {found} out of order, expected {expected}")]
    UnexpectedId {
        kind: EntityKind,
        expected: u64,
        found: u64,
    },

    /// An event refers to a row that does not exist.
    #[error("{kind} {id} does not exist")]
    MissingRow { kind: EntityKind, id: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_the_published_taxonomy() {
        assert_eq!(LedgerError::NotAuthorized.code(), 100);
        assert_eq!(LedgerError::not_found(EntityKind::Applicant).code(), 101);
        assert_eq!(LedgerError::not_found(EntityKind::Application).code(), 102);
        assert_eq!(LedgerError::AlreadyVerified.code(), 103);

        assert_eq!(LedgerError::InvalidAmount.code(), 101);
        assert_eq!(LedgerError::not_found(EntityKind::Scholarship).code(), 102);

        assert_eq!(LedgerError::not_found(EntityKind::Institution).code(), 101);
        assert_eq!(LedgerError::not_found(EntityKind::Disbursement).code(), 102);

        assert_eq!(LedgerError::not_found(EntityKind::AcademicRecord).code(), 101);
        assert_eq!(LedgerError::not_found(EntityKind::Milestone).code(), 102);
    }

    #[test]
    fn not_found_message_names_the_table() {
        let err = LedgerError::not_found(EntityKind::AcademicRecord);
        assert_eq!(err.to_string(), "academic record not found");
    }

    #[test]
    fn event_conflict_messages() {
        let out_of_order = EventConflict::UnexpectedId {
            kind: EntityKind::Applicant,
            expected: 2,
            found: 1,
        };
        assert_eq!(out_of_order.to_string(), "applicant id 1 out of order, expected 2");

        let missing = EventConflict::MissingRow {
            kind: EntityKind::Milestone,
            id: 9,
        };
        assert_eq!(missing.to_string(), "milestone 9 does not exist");
    }
}
