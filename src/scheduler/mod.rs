//! Review-load flattening scheduler.
//!
//! This module provides:
//! - **Selection**: which items must move — the overdue backlog plus the
//!   excess on days holding more than the limit.
//! - **Placement**: a forward day walk that pours the ordered queue into
//!   per-day quotas, skipping blocked and saturated days.
//! - **Flatten runs**: preconditions, orchestration and the commit summary.
//! - **FlattenJob**: background execution with a shared progress/cancel
//!   handle for the foreground.
//!
//! # Architecture
//!
//! A run is a single pass: select → order → place → commit. Quotas come
//! from a pre-run occupancy snapshot, so placement never feeds back into
//! itself and identical inputs always produce identical assignments.
//!
//! # Example
//!
//! ```ignore
//! use flatr::scheduler::{FlattenJob, FlattenRequest};
//! use flatr::store::SqliteStore;
//!
//! let store = SqliteStore::open(Path::new("collection.db"))?;
//! let timeline = store.timeline()?;
//! let today = store.today()?;
//!
//! let job = FlattenJob::spawn(store, timeline, today, FlattenRequest::new(100));
//! let summary = job.join().await?;
//! ```

mod flatten;
mod job;
mod plan;
mod progress;
mod select;

pub use flatten::{FlattenRequest, FlattenSummary, UNDO_LABEL, flatten};
pub use job::FlattenJob;
pub use plan::{CANCEL_CHECK_EVERY, HORIZON_DAYS, PlacementConfig, PlacementOutcome, place};
pub use progress::ProgressHandle;
pub use select::{fill_order, select_backlog, select_overflow};
