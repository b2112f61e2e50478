//! Selection: which items a flatten run must move.
//!
//! Two disjoint groups come out of the candidate snapshot:
//! - **Backlog**: everything overdue (effective due before today).
//! - **Overflow**: for each future due-day bucket holding more than the
//!   limit, the items beyond the first `limit` when ranked by ascending
//!   stability. The least-stable items in an overloaded bucket stay put;
//!   the ones with the most memory slack are pushed out.
//!
//! The per-bucket partition-and-rank is a plain group-by-then-sort over the
//! snapshot, with deterministic tie-breaking so identical inputs always
//! select identically.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::{DayIndex, QueuedItem};

/// Ascending stability, ties broken by due day then id. Total and
/// deterministic, which is all the fill order needs.
fn by_stability(a: &QueuedItem, b: &QueuedItem) -> Ordering {
    a.stability
        .total_cmp(&b.stability)
        .then_with(|| a.due.cmp(&b.due))
        .then_with(|| a.id.cmp(&b.id))
}

/// Overdue items, sorted ascending by stability.
pub fn select_backlog(candidates: &[QueuedItem], today: DayIndex) -> Vec<QueuedItem> {
    let mut backlog: Vec<QueuedItem> = candidates.iter().filter(|c| c.due < today).cloned().collect();
    backlog.sort_by(by_stability);
    tracing::debug!(count = backlog.len(), "Selected backlog");
    backlog
}

/// Excess items from overloaded future buckets, sorted ascending by
/// stability across the whole overflow set.
pub fn select_overflow(candidates: &[QueuedItem], today: DayIndex, limit: usize) -> Vec<QueuedItem> {
    let mut buckets: HashMap<DayIndex, Vec<QueuedItem>> = HashMap::new();
    for candidate in candidates.iter().filter(|c| c.due >= today) {
        buckets.entry(candidate.due).or_default().push(candidate.clone());
    }

    let mut overflow = Vec::new();
    for (_, mut bucket) in buckets {
        if bucket.len() <= limit {
            continue;
        }
        // Rank within the bucket; everything past the first `limit` moves.
        bucket.sort_by(by_stability);
        overflow.extend(bucket.into_iter().skip(limit));
    }

    overflow.sort_by(by_stability);
    tracing::debug!(count = overflow.len(), "Selected overflow");
    overflow
}

/// The final fill order: backlog first, then overflow.
pub fn fill_order(backlog: Vec<QueuedItem>, overflow: Vec<QueuedItem>) -> Vec<QueuedItem> {
    let mut queue = backlog;
    queue.extend(overflow);
    queue
}
