//! Scheduled item types.
//!
//! An `ItemRecord` is one row of the collection's `items` table. Its memory
//! payload is a JSON blob owned by the host's adaptive scheduler; flatr only
//! reads the stability score out of it and writes a provenance marker back.

use serde::{Deserialize, Serialize};

use crate::domain::mutation::STABILITY_KEY;

/// Item identifier (millisecond epoch id, assigned by the host collection).
pub type ItemId = i64;

/// Day index relative to the collection's day zero.
pub type DayIndex = i64;

/// Queue an item currently sits in.
///
/// Stored as an integer code in the collection. Only `Review` items are
/// eligible for flattening.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    New,
    Learning,
    Review,
    Suspended,
    Buried,
}

impl QueueState {
    /// Integer code used in the `items.queue` column.
    pub fn code(&self) -> i64 {
        match self {
            QueueState::New => 0,
            QueueState::Learning => 1,
            QueueState::Review => 2,
            QueueState::Suspended => -1,
            QueueState::Buried => -2,
        }
    }

    /// Decode the `items.queue` column.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(QueueState::New),
            1 => Some(QueueState::Learning),
            2 => Some(QueueState::Review),
            -1 => Some(QueueState::Suspended),
            -2 => Some(QueueState::Buried),
            _ => None,
        }
    }
}

/// One scheduled item as stored in the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    /// Item id.
    pub id: ItemId,

    /// Owning deck.
    pub deck_id: i64,

    /// Current queue.
    pub queue: QueueState,

    /// Scheduled due day.
    pub due: DayIndex,

    /// Home due day while the item is temporarily relocated into a side
    /// list. When set, this is the real scheduled day and `due` is transient.
    pub parked_due: Option<DayIndex>,

    /// Current interval in days.
    pub interval: i64,

    /// JSON memory payload from the adaptive scheduler. Empty string for
    /// items it has never touched.
    pub payload: String,
}

impl ItemRecord {
    /// The due day the item is really scheduled for, normalized across the
    /// parked/home split.
    pub fn effective_due(&self) -> DayIndex {
        self.parked_due.unwrap_or(self.due)
    }

    /// Stability score from the memory payload, if present.
    pub fn stability(&self) -> Option<f64> {
        if self.payload.is_empty() {
            return None;
        }
        let value: serde_json::Value = serde_json::from_str(&self.payload).ok()?;
        value.get(STABILITY_KEY)?.as_f64()
    }

    /// Whether the item can be considered for flattening: in the review
    /// queue, with a non-empty payload carrying a stability score.
    pub fn is_flatten_candidate(&self) -> bool {
        self.queue == QueueState::Review && !self.payload.is_empty() && self.stability().is_some()
    }
}

/// A selected item flowing through Selection, Ordering and Placement.
///
/// Carries just the fields the scheduler ranks and fills with; the full
/// record stays in the store until commit.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedItem {
    /// Item id.
    pub id: ItemId,

    /// Effective due day at selection time.
    pub due: DayIndex,

    /// Stability score (always present for selected items).
    pub stability: f64,

    /// Interval in days before flattening. Fallback anchor when the item
    /// has no recorded review.
    pub interval: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_item(id: ItemId, due: DayIndex, payload: &str) -> ItemRecord {
        ItemRecord {
            id,
            deck_id: 1,
            queue: QueueState::Review,
            due,
            parked_due: None,
            interval: 10,
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_queue_state_codes_round_trip() {
        for state in [
            QueueState::New,
            QueueState::Learning,
            QueueState::Review,
            QueueState::Suspended,
            QueueState::Buried,
        ] {
            assert_eq!(QueueState::from_code(state.code()), Some(state));
        }
        assert_eq!(QueueState::from_code(99), None);
    }

    #[test]
    fn test_effective_due_prefers_parked() {
        let mut item = review_item(1, 250, r#"{"s":3.0}"#);
        assert_eq!(item.effective_due(), 250);

        item.parked_due = Some(120);
        assert_eq!(item.effective_due(), 120);
    }

    #[test]
    fn test_stability_parsed_from_payload() {
        let item = review_item(1, 100, r#"{"s":4.25,"d":6.1}"#);
        assert_eq!(item.stability(), Some(4.25));
    }

    #[test]
    fn test_stability_absent() {
        assert_eq!(review_item(1, 100, "").stability(), None);
        assert_eq!(review_item(1, 100, r#"{"d":6.1}"#).stability(), None);
        assert_eq!(review_item(1, 100, "not json").stability(), None);
    }

    #[test]
    fn test_flatten_candidate_requires_review_queue() {
        let mut item = review_item(1, 100, r#"{"s":2.0}"#);
        assert!(item.is_flatten_candidate());

        item.queue = QueueState::Suspended;
        assert!(!item.is_flatten_candidate());
    }

    #[test]
    fn test_flatten_candidate_requires_payload() {
        assert!(!review_item(1, 100, "").is_flatten_candidate());
        assert!(!review_item(1, 100, r#"{"d":1.0}"#).is_flatten_candidate());
    }
}
