//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Two `Amount`s
/// of 100 are the same amount; two applicants with the same name are not the
/// same applicant (those are entities, see [`crate::Entity`]).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Grade point average with two implied decimal places (`380` is 3.80).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gpa(u32);

impl Gpa {
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    /// Whether this GPA meets a minimum criterion.
    pub fn meets(self, criterion: Gpa) -> bool {
        self >= criterion
    }
}

impl ValueObject for Gpa {}

impl core::fmt::Display for Gpa {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Monetary amount in the smallest unit. Always non-negative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u128 {
        self.0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl ValueObject for Amount {}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Opaque logical timestamp supplied by the calling environment
/// (e.g. the current block height).
///
/// The ledger stores it verbatim; it never generates or validates one.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHeight(u64);

impl BlockHeight {
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl ValueObject for BlockHeight {}

impl core::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpa_displays_with_two_decimals() {
        assert_eq!(Gpa::from_hundredths(380).to_string(), "3.80");
        assert_eq!(Gpa::from_hundredths(405).to_string(), "4.05");
        assert_eq!(Gpa::from_hundredths(7).to_string(), "0.07");
    }

    #[test]
    fn gpa_meets_inclusive_criterion() {
        let criterion = Gpa::from_hundredths(350);
        assert!(Gpa::from_hundredths(350).meets(criterion));
        assert!(Gpa::from_hundredths(390).meets(criterion));
        assert!(!Gpa::from_hundredths(349).meets(criterion));
    }

    #[test]
    fn amount_checked_add_detects_overflow() {
        assert_eq!(
            Amount::new(50_000).checked_add(Amount::new(25_000)),
            Some(Amount::new(75_000))
        );
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
    }
}
