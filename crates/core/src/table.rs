//! Auto-incrementing entity table.

use std::collections::BTreeMap;

use crate::entity::Entity;
use crate::error::{EntityKind, EventConflict, LedgerError, LedgerResult};
use crate::id::SequentialId;

/// An owned table of entities keyed by a counter-assigned id.
///
/// The counter starts at 0 and only moves forward when a row is inserted, so
/// `count()` is always the number of rows ever created. Rows are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<T: Entity> {
    rows: BTreeMap<T::Id, T>,
    counter: u64,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            counter: 0,
        }
    }
}

impl<T: Entity> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next inserted row will receive.
    pub fn next_id(&self) -> T::Id {
        T::Id::from_seq(self.counter + 1)
    }

    /// Current counter value (number of rows created).
    pub fn count(&self) -> u64 {
        self.counter
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// Existence check: the row, or this table's NOT_FOUND kind.
    pub fn require(&self, id: T::Id, kind: EntityKind) -> LedgerResult<&T> {
        self.rows.get(&id).ok_or(LedgerError::not_found(kind))
    }

    /// Check that a recorded creation names exactly `next_id()`.
    pub fn expect_next(&self, id: T::Id, kind: EntityKind) -> Result<(), EventConflict> {
        let expected = self.next_id();
        if id == expected {
            Ok(())
        } else {
            Err(EventConflict::UnexpectedId {
                kind,
                expected: expected.seq(),
                found: id.seq(),
            })
        }
    }

    /// Check that a recorded mutation targets an existing row.
    pub fn expect_row(&self, id: T::Id, kind: EntityKind) -> Result<&T, EventConflict> {
        self.rows
            .get(&id)
            .ok_or(EventConflict::MissingRow { kind, id: id.seq() })
    }

    /// Insert a row under its own id and advance the counter past it.
    ///
    /// Rows must carry `next_id()`: callers decide the id in a pure step
    /// (checked with [`Table::expect_next`] for recorded events) and insert
    /// it when the decision is applied.
    pub fn insert(&mut self, row: T) {
        let id = row.id();
        self.counter = self.counter.max(id.seq());
        self.rows.insert(id, row);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}
