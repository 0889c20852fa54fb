//! Strongly-typed, table-assigned identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// An identifier handed out by a per-table counter.
///
/// Counters start at 0, so the first assigned id is 1. An id is never reused.
pub trait SequentialId: Copy + Ord + core::hash::Hash + core::fmt::Debug {
    /// Build the id for the given counter value.
    fn from_seq(seq: u64) -> Self;

    /// The counter value this id was assigned from.
    fn seq(self) -> u64;
}

/// Identifier of an applicant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(u64);

/// Identifier of a scholarship application.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(u64);

/// Identifier of a scholarship.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScholarshipId(u64);

/// Identifier of a registered institution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstitutionId(u64);

/// Identifier of a fund disbursement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisbursementId(u64);

/// Identifier of an academic record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

/// Identifier of a milestone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneId(u64);

macro_rules! impl_sequential_newtype {
    ($t:ty) => {
        impl $t {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl SequentialId for $t {
            fn from_seq(seq: u64) -> Self {
                Self(seq)
            }

            fn seq(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

impl_sequential_newtype!(ApplicantId);
impl_sequential_newtype!(ApplicationId);
impl_sequential_newtype!(ScholarshipId);
impl_sequential_newtype!(InstitutionId);
impl_sequential_newtype!(DisbursementId);
impl_sequential_newtype!(RecordId);
impl_sequential_newtype!(MilestoneId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&ScholarshipId::new(5)).unwrap();
        assert_eq!(json, "5");

        let back: ScholarshipId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ScholarshipId::new(5));
    }

    #[test]
    fn ids_parse_from_strings() {
        assert_eq!("42".parse::<MilestoneId>().unwrap(), MilestoneId::new(42));
        assert!("forty-two".parse::<MilestoneId>().is_err());
    }
}
