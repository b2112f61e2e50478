//! Item mutations produced by a flatten run.

use crate::domain::item::{DayIndex, ItemId};

/// Payload key holding the stability score.
pub const STABILITY_KEY: &str = "s";

/// Payload key holding the provenance marker.
pub const PROVENANCE_KEY: &str = "v";

/// Provenance value written to items rescheduled by flattening.
pub const PROVENANCE_FLATTEN: &str = "flatten";

/// A staged reschedule for one item.
///
/// Carries only the new state; the store captures prior state inside the
/// commit transaction so the whole batch is undoable as one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMutation {
    /// Item to reschedule.
    pub id: ItemId,

    /// New due day.
    pub new_due: DayIndex,

    /// New interval in days, anchored to the item's last review.
    pub new_interval: i64,
}
