//! Shared progress and cancellation state for a flatten run.
//!
//! The background worker and the foreground display share exactly three
//! pieces of state: the processed count, the total count, and one
//! cancellation flag. Everything else a run touches is owned by the worker
//! until commit.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Progress/cancel channel between a flatten worker and its caller.
///
/// The worker writes `processed`/`total` and reads `cancel`; the foreground
/// reads the counters for display and writes `cancel` to request a stop.
#[derive(Debug, Default)]
pub struct ProgressHandle {
    processed: AtomicUsize,
    total: AtomicUsize,
    cancel: AtomicBool,
}

impl ProgressHandle {
    /// Create a fresh handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the total number of items selected for this run.
    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Record how many items have been placed so far.
    pub fn set_processed(&self, processed: usize) {
        self.processed.store(processed, Ordering::Relaxed);
    }

    /// Current (processed, total) pair.
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.processed.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    /// Ask the worker to stop at its next cancellation check.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handle_is_idle() {
        let handle = ProgressHandle::new();
        assert_eq!(handle.snapshot(), (0, 0));
        assert!(!handle.is_cancel_requested());
    }

    #[test]
    fn test_counters_update() {
        let handle = ProgressHandle::new();
        handle.set_total(2000);
        handle.set_processed(500);
        assert_eq!(handle.snapshot(), (500, 2000));
    }

    #[test]
    fn test_cancel_request() {
        let handle = ProgressHandle::new();
        assert!(!handle.is_cancel_requested());
        handle.request_cancel();
        assert!(handle.is_cancel_requested());
    }

    #[test]
    fn test_shared_across_threads() {
        use std::sync::Arc;

        let handle = Arc::new(ProgressHandle::new());
        let worker = handle.clone();

        let join = std::thread::spawn(move || {
            worker.set_total(10);
            worker.set_processed(10);
        });
        join.join().unwrap();

        assert_eq!(handle.snapshot(), (10, 10));
    }
}
