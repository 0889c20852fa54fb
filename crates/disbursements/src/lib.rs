//! Disbursements module (institution registry and fund disbursements,
//! event-sourced).
//!
//! Pure domain logic only: processing a disbursement flags its status, it
//! never moves money.

pub mod ledger;

pub use ledger::{
    CancelDisbursement, CreateDisbursement, Disbursement, DisbursementCancelled,
    DisbursementCommand, DisbursementCreated, DisbursementEvent, DisbursementLedger,
    DisbursementProcessed, DisbursementStatus, Institution, InstitutionRegistered,
    ProcessDisbursement, RegisterInstitution,
};
