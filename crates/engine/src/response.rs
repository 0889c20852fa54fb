//! Host-facing call results.

use serde::{Deserialize, Serialize};

use bursary_core::LedgerResult;

/// Outcome of one ledger call as the host sees it.
///
/// Serializes as `{ "type": "ok", "value": ... }` or
/// `{ "type": "err", "value": <code> }`, where the code is the numeric
/// error code of the failing sub-ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CallResult<T> {
    Ok(T),
    Err(u32),
}

impl<T> CallResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, CallResult::Ok(_))
    }

    /// The error code, if the call failed.
    pub fn code(&self) -> Option<u32> {
        match self {
            CallResult::Ok(_) => None,
            CallResult::Err(code) => Some(*code),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            CallResult::Ok(value) => Some(value),
            CallResult::Err(_) => None,
        }
    }
}

impl<T> From<LedgerResult<T>> for CallResult<T> {
    fn from(result: LedgerResult<T>) -> Self {
        match result {
            Ok(value) => CallResult::Ok(value),
            Err(err) => CallResult::Err(err.code()),
        }
    }
}
