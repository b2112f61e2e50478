//! Storage trait for the collection the scheduler runs against.
//!
//! The flatten run needs four things from the host collection: a candidate
//! snapshot, a pre-run occupancy snapshot, last-review lookups, and an
//! atomic batch write. Keeping them behind a trait keeps the scheduler
//! testable against any backing store.

use std::collections::HashMap;

use crate::domain::{DayIndex, ItemId, ItemMutation, QueuedItem};
use crate::error::Result;

/// Which items a flatten run may touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// The whole collection.
    #[default]
    All,
    /// One deck and its descendants.
    Deck(i64),
}

/// Read/write contract the scheduler needs from the collection.
pub trait ReviewStore {
    /// In-scope review items eligible for flattening: non-empty memory
    /// payload with a stability score. Order is unspecified; Selection
    /// sorts.
    fn flatten_candidates(&self, scope: Scope) -> Result<Vec<QueuedItem>>;

    /// Count of items already due per day, for days at or after `today`.
    ///
    /// Counts every in-scope review item, including ones without a
    /// stability score: a saturated day is saturated regardless of whether
    /// its items could themselves be flattened.
    fn due_occupancy(&self, today: DayIndex, scope: Scope) -> Result<HashMap<DayIndex, usize>>;

    /// Most recent review day for each of the given items. Items with no
    /// recorded review are absent from the map.
    fn last_review_days(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, DayIndex>>;

    /// Apply all mutations as one transaction, registered as a single undo
    /// entry under `label`. Returns the number of items written.
    fn apply_mutations(&mut self, label: &str, mutations: &[ItemMutation]) -> Result<usize>;

    /// Whether the host's adaptive scheduler manages this collection.
    /// Flattening refuses to run when it does not.
    fn adaptive_scheduler_enabled(&self) -> Result<bool>;
}
