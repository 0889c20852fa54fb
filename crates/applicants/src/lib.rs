//! Applicants module (applicant registry and scholarship applications,
//! event-sourced).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod ledger;

pub use ledger::{
    Applicant, ApplicantCommand, ApplicantEvent, ApplicantLedger, ApplicantRegistered,
    ApplicantVerified, Application, ApplicationStatus, ApplicationStatusUpdated,
    ApplicationSubmitted, ApplyForScholarship, RegisterApplicant, UpdateApplicationStatus,
    VerifyApplicant,
};
