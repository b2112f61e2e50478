//! Placement: pour the ordered queue into future days under the cap.
//!
//! A day cursor walks forward from today. Each day gets a quota of
//! `limit - pre_run_occupancy`, blocked weekdays and saturated days are
//! skipped, and items are taken from the front of the queue in fill order.
//! Quotas come from the pre-run snapshot only; items placed during the run
//! never shrink a later day's quota.

use std::collections::HashMap;

use crate::calendar::{Timeline, WeekdaySet};
use crate::domain::{DayIndex, ItemId, ItemMutation, QueuedItem};
use crate::scheduler::progress::ProgressHandle;

/// Maximum forward window the cursor will search: 100 years of days.
pub const HORIZON_DAYS: i64 = 36_500;

/// How many placements happen between cancellation checks.
pub const CANCEL_CHECK_EVERY: usize = 500;

/// Parameters for one placement pass.
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    /// First day the cursor may assign to.
    pub today: DayIndex,

    /// Per-day capacity.
    pub limit: usize,

    /// Weekdays that receive no flattened items. Empty when load balancing
    /// is off.
    pub blocked_days: WeekdaySet,

    /// Forward search bound in days.
    pub horizon_days: i64,
}

impl PlacementConfig {
    /// Config with the standard horizon.
    pub fn new(today: DayIndex, limit: usize, blocked_days: WeekdaySet) -> Self {
        Self {
            today,
            limit,
            blocked_days,
            horizon_days: HORIZON_DAYS,
        }
    }
}

/// Result of a placement pass.
#[derive(Debug)]
pub struct PlacementOutcome {
    /// Staged mutations, in fill order.
    pub mutations: Vec<ItemMutation>,

    /// Whether the pass stopped at a cancellation check.
    pub cancelled: bool,
}

/// Assign every queued item a new due day.
///
/// `occupancy` is the pre-run due-count snapshot and `last_reviews` the
/// prefetched most-recent review day per item. The pass stops when the
/// queue is drained, the horizon is exhausted, or a cancellation check
/// fires; whatever was staged up to that point is returned either way.
pub fn place(
    queue: &[QueuedItem],
    occupancy: &HashMap<DayIndex, usize>,
    last_reviews: &HashMap<ItemId, DayIndex>,
    timeline: Timeline,
    config: &PlacementConfig,
    progress: &ProgressHandle,
) -> PlacementOutcome {
    let total = queue.len();
    progress.set_total(total);

    let mut mutations: Vec<ItemMutation> = Vec::with_capacity(total);
    let mut cancelled = false;

    'days: for day in config.today..config.today + config.horizon_days {
        let placed = mutations.len();
        if placed >= total {
            break;
        }

        if config.blocked_days.contains(timeline.weekday_of(day)) {
            continue;
        }

        let used = occupancy.get(&day).copied().unwrap_or(0);
        if used >= config.limit {
            continue;
        }

        let quota = config.limit - used;
        let end = (placed + quota).min(total);
        for item in &queue[placed..end] {
            mutations.push(ItemMutation {
                id: item.id,
                new_due: day,
                new_interval: interval_for(item, day, last_reviews),
            });
            progress.set_processed(mutations.len());

            if mutations.len() % CANCEL_CHECK_EVERY == 0 && progress.is_cancel_requested() {
                cancelled = true;
                break 'days;
            }
        }
    }

    tracing::debug!(
        placed = mutations.len(),
        total = total,
        cancelled = cancelled,
        "Placement pass finished"
    );
    PlacementOutcome { mutations, cancelled }
}

/// New interval for an item landing on `day`, anchored to its most recent
/// review. Items with no recorded review fall back to their previous
/// anchor of `due - interval`. Never shorter than one day.
fn interval_for(item: &QueuedItem, day: DayIndex, last_reviews: &HashMap<ItemId, DayIndex>) -> i64 {
    let anchor = last_reviews
        .get(&item.id)
        .copied()
        .unwrap_or(item.due - item.interval);
    (day - anchor).max(1)
}
