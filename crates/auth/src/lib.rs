//! `bursary-auth`: caller identity and the ledger's authorization policy.
//!
//! This crate is intentionally decoupled from transport and storage: the host
//! authenticates callers and hands the ledger an explicit [`CallerContext`].

pub mod authorize;
pub mod context;
pub mod principal;

pub use authorize::{AuthzError, Policy, Requirement};
pub use context::{Call, CallerContext};
pub use principal::PrincipalId;
