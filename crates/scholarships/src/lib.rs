//! Scholarships module (scholarship funds and their lifecycle, event-sourced).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod ledger;

pub use ledger::{
    ActivateScholarship, CreateScholarship, DeactivateScholarship, FundScholarship, Scholarship,
    ScholarshipActivated, ScholarshipCommand, ScholarshipCreated, ScholarshipDeactivated,
    ScholarshipEvent, ScholarshipFunded, ScholarshipLedger,
};
