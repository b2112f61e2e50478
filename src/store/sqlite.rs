//! SQLite-backed collection store.
//!
//! One collection file holds the scheduled items, the deck tree, the review
//! log, collection metadata, and the undo log. Flatten commits are a single
//! transaction that also records the prior state of every touched item as
//! one undo entry, so the whole batch reverts together.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};

use crate::calendar::Timeline;
use crate::domain::{
    DayIndex, ItemId, ItemMutation, ItemRecord, PROVENANCE_FLATTEN, PROVENANCE_KEY, QueueState,
    QueuedItem,
};
use crate::error::{FlatrError, Result};
use crate::store::traits::{ReviewStore, Scope};

/// Meta key for the adaptive-scheduler feature gate.
const META_ADAPTIVE: &str = "adaptive_scheduler";
/// Meta key for the calendar date of day index 0.
const META_DAY_ZERO: &str = "day_zero";
/// Meta key for the hour the collection day rolls over.
const META_ROLLOVER_HOUR: &str = "rollover_hour";

/// SQLite collection store.
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    /// Open or create a collection at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Connection::open(path)?;
        Self::from_connection(db)
    }

    /// Open an in-memory collection. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        let store = Self { db };
        store.init_schema()?;
        store.init_meta()?;
        Ok(store)
    }

    /// Initialize the schema.
    fn init_schema(&self) -> Result<()> {
        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY,
                deck_id INTEGER NOT NULL,
                queue INTEGER NOT NULL,
                due INTEGER NOT NULL,
                parked_due INTEGER,
                interval INTEGER NOT NULL,
                payload TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_items_deck ON items(deck_id);
            CREATE INDEX IF NOT EXISTS idx_items_queue_due ON items(queue, due);

            CREATE TABLE IF NOT EXISTS decks (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                parent INTEGER
            );

            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id INTEGER NOT NULL,
                day INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_item ON reviews(item_id, day);

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS undo_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS undo_steps (
                entry_id INTEGER NOT NULL,
                item_id INTEGER NOT NULL,
                due INTEGER NOT NULL,
                parked_due INTEGER,
                interval INTEGER NOT NULL,
                payload TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Seed calendar metadata on first open.
    fn init_meta(&self) -> Result<()> {
        if self.get_meta(META_DAY_ZERO)?.is_none() {
            let today = Local::now().date_naive();
            self.set_meta(META_DAY_ZERO, &today.format("%Y-%m-%d").to_string())?;
        }
        if self.get_meta(META_ROLLOVER_HOUR)?.is_none() {
            self.set_meta(META_ROLLOVER_HOUR, "4")?;
        }
        Ok(())
    }

    /// Read a meta value.
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Write a meta value.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.db.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Enable or disable the adaptive-scheduler gate.
    pub fn set_adaptive_scheduler(&self, enabled: bool) -> Result<()> {
        self.set_meta(META_ADAPTIVE, if enabled { "true" } else { "false" })
    }

    /// Override the calendar anchor. Mostly for tests and imports.
    pub fn set_day_zero(&self, date: NaiveDate) -> Result<()> {
        self.set_meta(META_DAY_ZERO, &date.format("%Y-%m-%d").to_string())
    }

    /// The collection's timeline (day zero + rollover hour).
    pub fn timeline(&self) -> Result<Timeline> {
        let day_zero = self
            .get_meta(META_DAY_ZERO)?
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
            .ok_or_else(|| FlatrError::Storage("collection has no day_zero".to_string()))?;
        let rollover = self
            .get_meta(META_ROLLOVER_HOUR)?
            .and_then(|s| s.parse::<u8>().ok())
            .unwrap_or(4);
        Ok(Timeline::new(day_zero, rollover))
    }

    /// Today's day index on the collection timeline.
    pub fn today(&self) -> Result<DayIndex> {
        Ok(self.timeline()?.today_at(Local::now().naive_local()))
    }

    /// Create a deck, returning its id.
    pub fn add_deck(&self, name: &str, parent: Option<i64>) -> Result<i64> {
        self.db.execute(
            "INSERT INTO decks (name, parent) VALUES (?1, ?2)",
            params![name, parent],
        )?;
        Ok(self.db.last_insert_rowid())
    }

    /// Look up a deck id by name.
    pub fn deck_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        let id = self
            .db
            .query_row("SELECT id FROM decks WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    /// A deck plus all of its descendants.
    pub fn deck_and_child_ids(&self, deck_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.db.prepare("SELECT id, parent FROM decks")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?)))?;

        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in rows {
            let (id, parent) = row?;
            if let Some(parent) = parent {
                children.entry(parent).or_default().push(id);
            }
        }

        let mut ids = vec![deck_id];
        let mut cursor = 0;
        while cursor < ids.len() {
            if let Some(kids) = children.get(&ids[cursor]) {
                ids.extend(kids.iter().copied());
            }
            cursor += 1;
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Insert an item.
    pub fn add_item(&self, item: &ItemRecord) -> Result<()> {
        self.db.execute(
            "INSERT INTO items (id, deck_id, queue, due, parked_due, interval, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.id,
                item.deck_id,
                item.queue.code(),
                item.due,
                item.parked_due,
                item.interval,
                item.payload,
            ],
        )?;
        Ok(())
    }

    /// Fetch an item by id.
    pub fn get_item(&self, id: ItemId) -> Result<Option<ItemRecord>> {
        let item = self
            .db
            .query_row(
                "SELECT id, deck_id, queue, due, parked_due, interval, payload
                 FROM items WHERE id = ?1",
                params![id],
                row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    /// Record a completed review for an item.
    pub fn add_review(&self, item_id: ItemId, day: DayIndex) -> Result<()> {
        self.db.execute(
            "INSERT INTO reviews (item_id, day) VALUES (?1, ?2)",
            params![item_id, day],
        )?;
        Ok(())
    }

    /// Undo the most recent undoable operation, restoring every item it
    /// touched in one transaction. Returns the entry label and item count.
    pub fn undo_last(&mut self) -> Result<(String, usize)> {
        let tx = self.db.transaction()?;

        let entry: Option<(i64, String)> = tx
            .query_row(
                "SELECT id, label FROM undo_entries ORDER BY id DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((entry_id, label)) = entry else {
            return Err(FlatrError::NothingToUndo("the undo log is empty".to_string()));
        };

        let count = {
            let mut stmt = tx.prepare(
                "SELECT item_id, due, parked_due, interval, payload
                 FROM undo_steps WHERE entry_id = ?1",
            )?;
            let steps = stmt.query_map(params![entry_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;

            let mut count = 0;
            for step in steps {
                let (item_id, due, parked_due, interval, payload) = step?;
                tx.execute(
                    "UPDATE items SET due = ?2, parked_due = ?3, interval = ?4, payload = ?5
                     WHERE id = ?1",
                    params![item_id, due, parked_due, interval, payload],
                )?;
                count += 1;
            }
            count
        };

        tx.execute("DELETE FROM undo_steps WHERE entry_id = ?1", params![entry_id])?;
        tx.execute("DELETE FROM undo_entries WHERE id = ?1", params![entry_id])?;
        tx.commit()?;

        tracing::info!(label = %label, items = count, "Undid operation");
        Ok((label, count))
    }

    /// SQL fragment for the deck filter of a scope, or empty for all decks.
    fn scope_clause(&self, scope: Scope) -> Result<String> {
        match scope {
            Scope::All => Ok(String::new()),
            Scope::Deck(deck_id) => {
                let ids = self.deck_and_child_ids(deck_id)?;
                Ok(format!(" AND deck_id IN {}", ids_to_sql(&ids)))
            }
        }
    }
}

impl ReviewStore for SqliteStore {
    fn flatten_candidates(&self, scope: Scope) -> Result<Vec<QueuedItem>> {
        let sql = format!(
            "SELECT id, deck_id, queue, due, parked_due, interval, payload
             FROM items WHERE queue = ?1 AND payload != ''{}",
            self.scope_clause(scope)?
        );
        let mut stmt = self.db.prepare(&sql)?;
        let rows = stmt.query_map(params![QueueState::Review.code()], row_to_item)?;

        let mut candidates = Vec::new();
        for row in rows {
            let item = row?;
            // Items the adaptive scheduler has not scored cannot be ranked.
            if let Some(stability) = item.stability() {
                candidates.push(QueuedItem {
                    id: item.id,
                    due: item.effective_due(),
                    stability,
                    interval: item.interval,
                });
            }
        }
        tracing::debug!(count = candidates.len(), "Fetched flatten candidates");
        Ok(candidates)
    }

    fn due_occupancy(&self, today: DayIndex, scope: Scope) -> Result<HashMap<DayIndex, usize>> {
        let sql = format!(
            "SELECT CASE WHEN parked_due IS NULL THEN due ELSE parked_due END AS effective_due,
                    COUNT(*)
             FROM items WHERE queue = ?1{}
             GROUP BY effective_due HAVING effective_due >= ?2",
            self.scope_clause(scope)?
        );
        let mut stmt = self.db.prepare(&sql)?;
        let rows = stmt.query_map(params![QueueState::Review.code(), today], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as usize))
        })?;

        let mut occupancy = HashMap::new();
        for row in rows {
            let (day, count) = row?;
            occupancy.insert(day, count);
        }
        Ok(occupancy)
    }

    fn last_review_days(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, DayIndex>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = format!(
            "SELECT item_id, MAX(day) FROM reviews WHERE item_id IN {} GROUP BY item_id",
            ids_to_sql(ids)
        );
        let mut stmt = self.db.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;

        let mut days = HashMap::new();
        for row in rows {
            let (item_id, day) = row?;
            days.insert(item_id, day);
        }
        Ok(days)
    }

    fn apply_mutations(&mut self, label: &str, mutations: &[ItemMutation]) -> Result<usize> {
        if mutations.is_empty() {
            return Ok(0);
        }

        let tx = self.db.transaction()?;
        tx.execute(
            "INSERT INTO undo_entries (label, created_at) VALUES (?1, ?2)",
            params![label, Local::now().timestamp_millis()],
        )?;
        let entry_id = tx.last_insert_rowid();

        let mut written = 0;
        for mutation in mutations {
            let prior = tx
                .query_row(
                    "SELECT due, parked_due, interval, payload FROM items WHERE id = ?1",
                    params![mutation.id],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, Option<i64>>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()?;
            let Some((due, parked_due, interval, payload)) = prior else {
                return Err(FlatrError::Storage(format!(
                    "item {} vanished during commit",
                    mutation.id
                )));
            };

            tx.execute(
                "INSERT INTO undo_steps (entry_id, item_id, due, parked_due, interval, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![entry_id, mutation.id, due, parked_due, interval, payload],
            )?;

            let tagged = tag_payload(&payload, PROVENANCE_KEY, PROVENANCE_FLATTEN)?;
            // A parked item keeps its home slot as the scheduled day.
            if parked_due.is_some() {
                tx.execute(
                    "UPDATE items SET parked_due = ?2, interval = ?3, payload = ?4 WHERE id = ?1",
                    params![mutation.id, mutation.new_due, mutation.new_interval, tagged],
                )?;
            } else {
                tx.execute(
                    "UPDATE items SET due = ?2, interval = ?3, payload = ?4 WHERE id = ?1",
                    params![mutation.id, mutation.new_due, mutation.new_interval, tagged],
                )?;
            }
            written += 1;
        }

        tx.commit()?;
        tracing::info!(label = %label, items = written, "Committed mutation batch");
        Ok(written)
    }

    fn adaptive_scheduler_enabled(&self) -> Result<bool> {
        Ok(self.get_meta(META_ADAPTIVE)?.as_deref() == Some("true"))
    }
}

/// Map an items row to a record.
fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<ItemRecord> {
    let queue_code: i64 = row.get(2)?;
    Ok(ItemRecord {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        queue: QueueState::from_code(queue_code).unwrap_or(QueueState::New),
        due: row.get(3)?,
        parked_due: row.get(4)?,
        interval: row.get(5)?,
        payload: row.get(6)?,
    })
}

/// Render an id list as a SQL IN clause body: `(1,2,3)`.
fn ids_to_sql(ids: &[i64]) -> String {
    let mut out = String::from("(");
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&id.to_string());
    }
    out.push(')');
    out
}

/// Set a key in a JSON payload, preserving everything else.
fn tag_payload(payload: &str, key: &str, value: &str) -> Result<String> {
    let mut parsed: serde_json::Value = if payload.is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(payload)?
    };
    if let Some(map) = parsed.as_object_mut() {
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn review_item(id: ItemId, deck_id: i64, due: DayIndex, stability: f64) -> ItemRecord {
        ItemRecord {
            id,
            deck_id,
            queue: QueueState::Review,
            due,
            parked_due: None,
            interval: 10,
            payload: format!(r#"{{"s":{}}}"#, stability),
        }
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("collection.db");
        let store = SqliteStore::open(&path).unwrap();
        assert!(!store.adaptive_scheduler_enabled().unwrap());
        assert!(path.exists());
    }

    #[test]
    fn test_meta_round_trip() {
        let store = store();
        assert_eq!(store.get_meta("missing").unwrap(), None);

        store.set_meta("k", "v1").unwrap();
        assert_eq!(store.get_meta("k").unwrap(), Some("v1".to_string()));

        store.set_meta("k", "v2").unwrap();
        assert_eq!(store.get_meta("k").unwrap(), Some("v2".to_string()));
    }

    #[test]
    fn test_adaptive_scheduler_gate() {
        let store = store();
        assert!(!store.adaptive_scheduler_enabled().unwrap());

        store.set_adaptive_scheduler(true).unwrap();
        assert!(store.adaptive_scheduler_enabled().unwrap());

        store.set_adaptive_scheduler(false).unwrap();
        assert!(!store.adaptive_scheduler_enabled().unwrap());
    }

    #[test]
    fn test_timeline_from_meta() {
        let store = store();
        store.set_day_zero(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()).unwrap();

        let timeline = store.timeline().unwrap();
        assert_eq!(
            timeline.date_of(7),
            NaiveDate::from_ymd_opt(2023, 1, 9).unwrap()
        );
    }

    #[test]
    fn test_deck_and_child_ids() {
        let store = store();
        let root = store.add_deck("Japanese", None).unwrap();
        let vocab = store.add_deck("Japanese::Vocab", Some(root)).unwrap();
        let kanji = store.add_deck("Japanese::Kanji", Some(root)).unwrap();
        let n5 = store.add_deck("Japanese::Vocab::N5", Some(vocab)).unwrap();
        let other = store.add_deck("Spanish", None).unwrap();

        let mut expected = vec![root, vocab, kanji, n5];
        expected.sort_unstable();
        assert_eq!(store.deck_and_child_ids(root).unwrap(), expected);
        assert_eq!(store.deck_and_child_ids(other).unwrap(), vec![other]);
    }

    #[test]
    fn test_deck_id_by_name() {
        let store = store();
        let id = store.add_deck("Spanish", None).unwrap();
        assert_eq!(store.deck_id_by_name("Spanish").unwrap(), Some(id));
        assert_eq!(store.deck_id_by_name("French").unwrap(), None);
    }

    #[test]
    fn test_flatten_candidates_filters() {
        let store = store();
        store.add_item(&review_item(1, 1, 100, 2.0)).unwrap();

        // Not in the review queue
        let mut learning = review_item(2, 1, 100, 2.0);
        learning.queue = QueueState::Learning;
        store.add_item(&learning).unwrap();

        // Empty payload
        let mut untouched = review_item(3, 1, 100, 2.0);
        untouched.payload = String::new();
        store.add_item(&untouched).unwrap();

        // Payload without stability
        let mut unscored = review_item(4, 1, 100, 2.0);
        unscored.payload = r#"{"d":5.0}"#.to_string();
        store.add_item(&unscored).unwrap();

        let candidates = store.flatten_candidates(Scope::All).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, 1);
        assert_eq!(candidates[0].stability, 2.0);
    }

    #[test]
    fn test_flatten_candidates_deck_scope() {
        let store = store();
        let root = store.add_deck("A", None).unwrap();
        let child = store.add_deck("A::B", Some(root)).unwrap();
        let other = store.add_deck("C", None).unwrap();

        store.add_item(&review_item(1, root, 100, 1.0)).unwrap();
        store.add_item(&review_item(2, child, 100, 1.0)).unwrap();
        store.add_item(&review_item(3, other, 100, 1.0)).unwrap();

        let mut ids: Vec<ItemId> = store
            .flatten_candidates(Scope::Deck(root))
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_candidates_use_parked_due() {
        let store = store();
        let mut parked = review_item(1, 1, 500, 3.0);
        parked.parked_due = Some(90);
        store.add_item(&parked).unwrap();

        let candidates = store.flatten_candidates(Scope::All).unwrap();
        assert_eq!(candidates[0].due, 90);
    }

    #[test]
    fn test_due_occupancy_counts_unscored_items() {
        let store = store();
        store.add_item(&review_item(1, 1, 100, 2.0)).unwrap();
        store.add_item(&review_item(2, 1, 100, 5.0)).unwrap();

        // No stability score, still occupies its day
        let mut unscored = review_item(3, 1, 100, 0.0);
        unscored.payload = String::new();
        store.add_item(&unscored).unwrap();

        // Before today: not part of the forward snapshot
        store.add_item(&review_item(4, 1, 95, 1.0)).unwrap();

        let occupancy = store.due_occupancy(100, Scope::All).unwrap();
        assert_eq!(occupancy.get(&100), Some(&3));
        assert_eq!(occupancy.get(&95), None);
    }

    #[test]
    fn test_last_review_days() {
        let store = store();
        store.add_review(1, 80).unwrap();
        store.add_review(1, 92).unwrap();
        store.add_review(2, 70).unwrap();

        let days = store.last_review_days(&[1, 2, 3]).unwrap();
        assert_eq!(days.get(&1), Some(&92));
        assert_eq!(days.get(&2), Some(&70));
        assert_eq!(days.get(&3), None);

        assert!(store.last_review_days(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_apply_mutations_updates_and_tags() {
        let mut store = store();
        store.add_item(&review_item(1, 1, 100, 2.0)).unwrap();

        let written = store
            .apply_mutations(
                "flatten",
                &[ItemMutation {
                    id: 1,
                    new_due: 130,
                    new_interval: 25,
                }],
            )
            .unwrap();
        assert_eq!(written, 1);

        let item = store.get_item(1).unwrap().unwrap();
        assert_eq!(item.due, 130);
        assert_eq!(item.interval, 25);
        assert_eq!(item.stability(), Some(2.0));

        let payload: serde_json::Value = serde_json::from_str(&item.payload).unwrap();
        assert_eq!(
            payload.get(PROVENANCE_KEY).and_then(|v| v.as_str()),
            Some(PROVENANCE_FLATTEN)
        );
    }

    #[test]
    fn test_apply_mutations_parked_item_keeps_home_slot() {
        let mut store = store();
        let mut parked = review_item(1, 1, 500, 3.0);
        parked.parked_due = Some(90);
        store.add_item(&parked).unwrap();

        store
            .apply_mutations(
                "flatten",
                &[ItemMutation {
                    id: 1,
                    new_due: 120,
                    new_interval: 30,
                }],
            )
            .unwrap();

        let item = store.get_item(1).unwrap().unwrap();
        assert_eq!(item.parked_due, Some(120));
        assert_eq!(item.due, 500);
    }

    #[test]
    fn test_apply_mutations_empty_batch_writes_no_undo_entry() {
        let mut store = store();
        assert_eq!(store.apply_mutations("flatten", &[]).unwrap(), 0);
        assert!(store.undo_last().is_err());
    }

    #[test]
    fn test_undo_restores_batch_as_one_entry() {
        let mut store = store();
        store.add_item(&review_item(1, 1, 100, 2.0)).unwrap();
        store.add_item(&review_item(2, 1, 101, 4.0)).unwrap();

        store
            .apply_mutations(
                "flatten",
                &[
                    ItemMutation { id: 1, new_due: 130, new_interval: 25 },
                    ItemMutation { id: 2, new_due: 131, new_interval: 26 },
                ],
            )
            .unwrap();

        let (label, count) = store.undo_last().unwrap();
        assert_eq!(label, "flatten");
        assert_eq!(count, 2);

        let first = store.get_item(1).unwrap().unwrap();
        assert_eq!(first.due, 100);
        assert_eq!(first.interval, 10);
        assert_eq!(first.payload, r#"{"s":2}"#);

        let second = store.get_item(2).unwrap().unwrap();
        assert_eq!(second.due, 101);

        // Only one entry existed
        assert!(store.undo_last().is_err());
    }

    #[test]
    fn test_ids_to_sql() {
        assert_eq!(ids_to_sql(&[1, 2, 3]), "(1,2,3)");
        assert_eq!(ids_to_sql(&[42]), "(42)");
    }

    #[test]
    fn test_tag_payload_preserves_existing_keys() {
        let tagged = tag_payload(r#"{"s":2.5,"d":6.0}"#, "v", "flatten").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&tagged).unwrap();
        assert_eq!(parsed.get("s").and_then(|v| v.as_f64()), Some(2.5));
        assert_eq!(parsed.get("v").and_then(|v| v.as_str()), Some("flatten"));
    }

    #[test]
    fn test_tag_payload_empty() {
        let tagged = tag_payload("", "v", "flatten").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&tagged).unwrap();
        assert_eq!(parsed.get("v").and_then(|v| v.as_str()), Some("flatten"));
    }
}
