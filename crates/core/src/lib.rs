//! `bursary-core`: ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every sub-ledger
//! (no IO, no logging, no authorization policy).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod table;
pub mod value_object;

pub use aggregate::Aggregate;
pub use entity::Entity;
pub use error::{EntityKind, EventConflict, LedgerError, LedgerResult};
pub use id::{
    ApplicantId, ApplicationId, DisbursementId, InstitutionId, MilestoneId, RecordId,
    ScholarshipId, SequentialId,
};
pub use table::Table;
pub use value_object::{Amount, BlockHeight, Gpa, ValueObject};
