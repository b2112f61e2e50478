//! Domain types shared by the scheduler and the collection store.

mod item;
mod mutation;

pub use item::{DayIndex, ItemId, ItemRecord, QueueState, QueuedItem};
pub use mutation::{ItemMutation, PROVENANCE_FLATTEN, PROVENANCE_KEY, STABILITY_KEY};
