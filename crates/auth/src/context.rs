use bursary_core::BlockHeight;

use crate::PrincipalId;

/// Caller context for a single ledger call.
///
/// Supplied by the host on every call: who is calling, the current logical
/// timestamp, and whether the host asserts the caller is an authorized
/// institution. The ledger never derives any of these itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    principal: PrincipalId,
    block_height: BlockHeight,
    authorized_institution: bool,
}

impl CallerContext {
    pub fn new(principal: impl Into<PrincipalId>, block_height: BlockHeight) -> Self {
        Self {
            principal: principal.into(),
            block_height,
            authorized_institution: false,
        }
    }

    /// Mark the caller as an authorized institution (host-asserted capability).
    pub fn with_authorized_institution(mut self, authorized: bool) -> Self {
        self.authorized_institution = authorized;
        self
    }

    pub fn principal(&self) -> &PrincipalId {
        &self.principal
    }

    pub fn block_height(&self) -> BlockHeight {
        self.block_height
    }

    pub fn is_authorized_institution(&self) -> bool {
        self.authorized_institution
    }
}

/// A command paired with the context of the caller issuing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<C> {
    pub caller: CallerContext,
    pub command: C,
}

impl<C> Call<C> {
    pub fn new(caller: CallerContext, command: C) -> Self {
        Self { caller, command }
    }
}
