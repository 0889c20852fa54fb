use thiserror::Error;

use bursary_core::LedgerError;

use crate::{CallerContext, PrincipalId};

/// Authorization mode an operation declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement<'a> {
    /// No gate (self-registration).
    Anyone,
    /// Caller must be the fixed authority.
    Authority,
    /// Caller must be the principal recorded on the target record.
    Owner(&'a PrincipalId),
    /// Caller must be the authority, or carry the host-asserted
    /// authorized-institution capability.
    AuthorityOrInstitution,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("'{caller}' is not the ledger authority")]
    NotAuthority { caller: PrincipalId },

    #[error("'{caller}' does not own the target record")]
    NotOwner { caller: PrincipalId },

    #[error("'{caller}' is neither the ledger authority nor an authorized institution")]
    NotAuthorityOrInstitution { caller: PrincipalId },
}

impl From<AuthzError> for LedgerError {
    fn from(_: AuthzError) -> Self {
        LedgerError::NotAuthorized
    }
}

/// The ledger's authorization policy.
///
/// A single authority identity is fixed at construction and never changes.
/// There are no roles, no delegation and no revocation.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    authority: PrincipalId,
}

impl Policy {
    pub fn new(authority: impl Into<PrincipalId>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    pub fn authority(&self) -> &PrincipalId {
        &self.authority
    }

    pub fn is_authority(&self, principal: &PrincipalId) -> bool {
        *principal == self.authority
    }

    pub fn authorize(
        &self,
        caller: &CallerContext,
        requirement: Requirement<'_>,
    ) -> Result<(), AuthzError> {
        let principal = caller.principal();
        match requirement {
            Requirement::Anyone => Ok(()),
            Requirement::Authority if self.is_authority(principal) => Ok(()),
            Requirement::Authority => Err(AuthzError::NotAuthority {
                caller: principal.clone(),
            }),
            Requirement::Owner(owner) if principal == owner => Ok(()),
            Requirement::Owner(_) => Err(AuthzError::NotOwner {
                caller: principal.clone(),
            }),
            Requirement::AuthorityOrInstitution
                if self.is_authority(principal) || caller.is_authorized_institution() =>
            {
                Ok(())
            }
            Requirement::AuthorityOrInstitution => Err(AuthzError::NotAuthorityOrInstitution {
                caller: principal.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursary_core::BlockHeight;

    const AUTHORITY: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    const STUDENT: &str = "ST2PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    fn caller(principal: &str) -> CallerContext {
        CallerContext::new(principal, BlockHeight::new(12345))
    }

    #[test]
    fn anyone_admits_every_caller() {
        let policy = Policy::new(AUTHORITY);
        assert!(policy.authorize(&caller(STUDENT), Requirement::Anyone).is_ok());
    }

    #[test]
    fn authority_admits_only_the_fixed_identity() {
        let policy = Policy::new(AUTHORITY);
        assert!(policy.authorize(&caller(AUTHORITY), Requirement::Authority).is_ok());

        let err = policy
            .authorize(&caller(STUDENT), Requirement::Authority)
            .unwrap_err();
        assert_eq!(
            err,
            AuthzError::NotAuthority {
                caller: PrincipalId::new(STUDENT)
            }
        );
        assert_eq!(LedgerError::from(err), LedgerError::NotAuthorized);
    }

    #[test]
    fn owner_is_not_satisfied_by_the_authority() {
        let policy = Policy::new(AUTHORITY);
        let owner = PrincipalId::new(STUDENT);

        assert!(policy.authorize(&caller(STUDENT), Requirement::Owner(&owner)).is_ok());
        assert!(matches!(
            policy.authorize(&caller(AUTHORITY), Requirement::Owner(&owner)),
            Err(AuthzError::NotOwner { .. })
        ));
    }

    #[test]
    fn institution_capability_stands_in_for_the_authority() {
        let policy = Policy::new(AUTHORITY);

        let plain = caller(STUDENT);
        assert!(policy.authorize(&plain, Requirement::AuthorityOrInstitution).is_err());

        let institution = caller(STUDENT).with_authorized_institution(true);
        assert!(policy
            .authorize(&institution, Requirement::AuthorityOrInstitution)
            .is_ok());

        // The capability does not widen authority-only operations.
        assert!(policy.authorize(&institution, Requirement::Authority).is_err());
    }
}
