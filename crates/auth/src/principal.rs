use core::convert::Infallible;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Identity of an authenticated principal (a person, an institution, a
/// service account).
///
/// Principals are opaque strings at this layer (e.g. a chain address); the
/// ledger only ever compares them for equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for PrincipalId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_string() {
        let principal = PrincipalId::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
        let json = serde_json::to_string(&principal).unwrap();
        assert_eq!(json, "\"ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM\"");

        let back: PrincipalId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, principal);
    }

    #[test]
    fn comparison_is_exact() {
        let a: PrincipalId = "ST1ABC".parse().unwrap();
        assert_eq!(a, PrincipalId::from("ST1ABC"));
        assert_ne!(a, PrincipalId::from("st1abc"));
    }
}
