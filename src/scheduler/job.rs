//! Background execution of a flatten run.
//!
//! The run is one long-lived unit of blocking work, pushed off the
//! interactive path onto tokio's blocking pool. The foreground keeps a
//! shared `ProgressHandle` for display and cancellation; the worker owns
//! the store and every intermediate queue until commit.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::calendar::Timeline;
use crate::domain::DayIndex;
use crate::error::{FlatrError, Result};
use crate::scheduler::flatten::{FlattenRequest, FlattenSummary, flatten};
use crate::scheduler::progress::ProgressHandle;
use crate::store::ReviewStore;

/// A flatten run in flight.
pub struct FlattenJob {
    handle: JoinHandle<Result<FlattenSummary>>,
    progress: Arc<ProgressHandle>,
}

impl FlattenJob {
    /// Spawn a flatten run on the blocking pool. Must be called from
    /// within a tokio runtime.
    pub fn spawn<S>(store: S, timeline: Timeline, today: DayIndex, request: FlattenRequest) -> Self
    where
        S: ReviewStore + Send + 'static,
    {
        Self::spawn_with(store, timeline, today, request, Arc::new(ProgressHandle::new()))
    }

    /// Spawn with a caller-owned progress handle, e.g. one already wired to
    /// a ctrl-c handler.
    pub fn spawn_with<S>(
        mut store: S,
        timeline: Timeline,
        today: DayIndex,
        request: FlattenRequest,
        progress: Arc<ProgressHandle>,
    ) -> Self
    where
        S: ReviewStore + Send + 'static,
    {
        let worker = progress.clone();
        let handle = tokio::task::spawn_blocking(move || {
            flatten(&mut store, timeline, today, &request, &worker)
        });
        Self { handle, progress }
    }

    /// Shared progress/cancel handle for foreground display.
    pub fn progress(&self) -> Arc<ProgressHandle> {
        self.progress.clone()
    }

    /// Ask the worker to stop at its next cancellation check.
    pub fn request_cancel(&self) {
        self.progress.request_cancel();
    }

    /// Whether the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to finish and return its summary.
    pub async fn join(self) -> Result<FlattenSummary> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(FlatrError::Storage(format!("flatten worker died: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemRecord, QueueState};
    use crate::store::SqliteStore;
    use chrono::NaiveDate;
    use std::time::Duration;

    const TODAY: DayIndex = 100;

    fn timeline() -> Timeline {
        Timeline::new(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(), 4)
    }

    fn seeded_store(items: i64) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_adaptive_scheduler(true).unwrap();
        for i in 1..=items {
            store
                .add_item(&ItemRecord {
                    id: i,
                    deck_id: 1,
                    queue: QueueState::Review,
                    due: TODAY,
                    parked_due: None,
                    interval: 10,
                    payload: format!(r#"{{"s":{}}}"#, i),
                })
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_job_runs_to_completion() {
        let store = seeded_store(8);
        let job = FlattenJob::spawn(store, timeline(), TODAY, FlattenRequest::new(5));

        let summary = job.join().await.unwrap();
        assert_eq!(summary.flattened, 3);
        assert!(!summary.cancelled);
    }

    #[tokio::test]
    async fn test_job_reports_progress() {
        let store = seeded_store(8);
        let job = FlattenJob::spawn(store, timeline(), TODAY, FlattenRequest::new(5));
        let progress = job.progress();

        let summary = job.join().await.unwrap();
        assert_eq!(summary.selected, 3);
        assert_eq!(progress.snapshot(), (3, 3));
    }

    #[tokio::test]
    async fn test_job_cancellation_preserves_partial_progress() {
        let store = seeded_store(2000);
        let progress = Arc::new(ProgressHandle::new());
        progress.request_cancel();

        // Cancellation is already pending when the worker starts, so the
        // first cadence check halts it with exactly 500 staged, and those
        // 500 are committed rather than rolled back.
        let job = FlattenJob::spawn_with(store, timeline(), TODAY, FlattenRequest::new(1000), progress);
        let summary = job.join().await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.flattened, 500);
        assert_eq!(summary.selected, 1000);
    }

    #[tokio::test]
    async fn test_job_surfaces_precondition_errors() {
        let store = SqliteStore::open_in_memory().unwrap();
        let job = FlattenJob::spawn(store, timeline(), TODAY, FlattenRequest::new(5));

        let result = job.join().await;
        assert!(matches!(result, Err(FlatrError::AdaptiveSchedulerDisabled)));
    }

    #[tokio::test]
    async fn test_job_is_finished_eventually() {
        let store = seeded_store(4);
        let job = FlattenJob::spawn(store, timeline(), TODAY, FlattenRequest::new(5));

        // Poll like the foreground would.
        let mut waited = Duration::ZERO;
        while !job.is_finished() && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += Duration::from_millis(10);
        }
        assert!(job.is_finished());

        let summary = job.join().await.unwrap();
        assert_eq!(summary.selected, 0);
    }
}
