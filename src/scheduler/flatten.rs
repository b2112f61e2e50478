//! One flatten run: preconditions, select, order, place, commit.

use std::time::{Duration, Instant};

use crate::calendar::{Timeline, WeekdaySet};
use crate::domain::{DayIndex, ItemId};
use crate::error::{FlatrError, Result};
use crate::scheduler::plan::{self, PlacementConfig};
use crate::scheduler::progress::ProgressHandle;
use crate::scheduler::select;
use crate::store::{ReviewStore, Scope};

/// Undo log label for flatten commits.
pub const UNDO_LABEL: &str = "flatten";

/// Caller-supplied parameters for a flatten run.
#[derive(Debug, Clone)]
pub struct FlattenRequest {
    /// Per-day capacity. Validated to be positive before any query runs.
    pub limit: i64,

    /// Which items may move.
    pub scope: Scope,

    /// Weekdays to keep empty when load balancing is on.
    pub easy_days: WeekdaySet,

    /// Whether easy days apply at all.
    pub load_balance: bool,

    /// Stage and report, but commit nothing.
    pub dry_run: bool,
}

impl FlattenRequest {
    /// A request with the given limit over the whole collection.
    pub fn new(limit: i64) -> Self {
        Self {
            limit,
            scope: Scope::All,
            easy_days: WeekdaySet::empty(),
            load_balance: false,
            dry_run: false,
        }
    }
}

/// What a flatten run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenSummary {
    /// Items rescheduled (staged items on a dry run).
    pub flattened: usize,

    /// Items selected for rescheduling.
    pub selected: usize,

    /// Whether the run stopped at a cancellation check. The items placed
    /// before the stop are committed, not rolled back.
    pub cancelled: bool,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Run one flatten pass against the store.
///
/// Preconditions are checked synchronously before the first query: the
/// collection's adaptive scheduler must be on and the limit positive. After
/// that the run cannot fail except on a store error; cancellation is a
/// successful partial run.
pub fn flatten<S: ReviewStore>(
    store: &mut S,
    timeline: Timeline,
    today: DayIndex,
    request: &FlattenRequest,
    progress: &ProgressHandle,
) -> Result<FlattenSummary> {
    if !store.adaptive_scheduler_enabled()? {
        return Err(FlatrError::AdaptiveSchedulerDisabled);
    }
    if request.limit <= 0 {
        return Err(FlatrError::InvalidLimit(request.limit));
    }
    let limit = request.limit as usize;
    let start = Instant::now();

    let candidates = store.flatten_candidates(request.scope)?;
    let backlog = select::select_backlog(&candidates, today);
    let overflow = select::select_overflow(&candidates, today, limit);
    let queue = select::fill_order(backlog, overflow);

    let occupancy = store.due_occupancy(today, request.scope)?;
    let ids: Vec<ItemId> = queue.iter().map(|q| q.id).collect();
    let last_reviews = store.last_review_days(&ids)?;

    let easy_days = if request.load_balance {
        request.easy_days
    } else {
        WeekdaySet::empty()
    };
    let config = PlacementConfig::new(today, limit, easy_days);
    let outcome = plan::place(&queue, &occupancy, &last_reviews, timeline, &config, progress);

    let flattened = if request.dry_run {
        outcome.mutations.len()
    } else {
        store.apply_mutations(UNDO_LABEL, &outcome.mutations)?
    };

    let summary = FlattenSummary {
        flattened,
        selected: queue.len(),
        cancelled: outcome.cancelled,
        elapsed: start.elapsed(),
    };
    tracing::info!(
        flattened = summary.flattened,
        selected = summary.selected,
        cancelled = summary.cancelled,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        dry_run = request.dry_run,
        "Flatten run finished"
    );
    Ok(summary)
}
