//! `bursary-engine`: the scholarship ledger engine.
//!
//! One [`LedgerEngine`] owns the four sub-ledgers (applicants, scholarships,
//! disbursements, outcomes) and exposes one entry point per operation. Every
//! call takes an explicit [`CallerContext`]; the host owns authentication,
//! transport and persistence.

pub mod config;
pub mod engine;
pub mod journal;
pub mod response;

pub use bursary_auth::{CallerContext, PrincipalId};
pub use config::EngineConfig;
pub use engine::LedgerEngine;
pub use journal::{Journal, LedgerEvent, ReplayError};
pub use response::CallResult;
