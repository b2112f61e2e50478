//! Collection store: the host of the scheduled items flatr mutates.
//!
//! The scheduler only talks to the `ReviewStore` trait; `SqliteStore` is the
//! concrete collection-file implementation.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ReviewStore, Scope};
