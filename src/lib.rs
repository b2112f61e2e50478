//! flatr - a review-load flattening scheduler
//!
//! flatr redistributes spaced-repetition reviews whose due dates cluster
//! unevenly: overdue items and items on overloaded days are poured into
//! future days under a per-day cap, most fragile items first, as one
//! undoable batch.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod scheduler;
pub mod store;

pub use error::{FlatrError, Result};
