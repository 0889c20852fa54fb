//! Engine configuration.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use bursary_auth::PrincipalId;

/// Settings fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The single identity allowed to perform authority-only operations.
    pub authority: PrincipalId,
}

impl EngineConfig {
    /// Environment variable holding the authority identity.
    pub const AUTHORITY_VAR: &'static str = "BURSARY_AUTHORITY";

    pub fn new(authority: impl Into<PrincipalId>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(Self::AUTHORITY_VAR)
            .with_context(|| format!("{} is not set", Self::AUTHORITY_VAR))?;

        let authority = raw.trim();
        if authority.is_empty() {
            bail!("{} is blank", Self::AUTHORITY_VAR);
        }

        Ok(Self::new(authority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_lookup_reads_and_trims_authority() {
        let config = EngineConfig::from_lookup(|key| {
            (key == "BURSARY_AUTHORITY")
                .then(|| "  ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM\n".to_string())
        })
        .unwrap();

        assert_eq!(
            config.authority,
            PrincipalId::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM")
        );
    }

    #[test]
    fn from_lookup_rejects_missing_or_blank_authority() {
        let err = EngineConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains("BURSARY_AUTHORITY is not set"));

        let err = EngineConfig::from_lookup(|_| Some("   ".to_string())).unwrap_err();
        assert!(err.to_string().contains("BURSARY_AUTHORITY is blank"));
    }

    #[test]
    fn deserializes_from_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "authority": "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM" }"#)
                .unwrap();
        assert_eq!(config.authority.as_str(), "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
    }
}
