//! Entity trait: identity + continuity across state changes.

use crate::id::SequentialId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed, table-assigned identifier.
    type Id: SequentialId;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
