use std::path::Path;

use contracts::{ScorableItem, StoredItem};
use rusqlite::{params, Connection};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("sqlite store is not attached")]
    NotAttached,
}

/// Narrowing applied by the item query before candidates reach the simulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    /// Keep items in any of these groups; empty keeps every group.
    pub group_ids: Vec<String>,
    pub max_price: Option<f64>,
}

/// Read side of the item catalogue. Only unacquired, positively priced items
/// are ever handed out, in insertion order.
#[derive(Debug)]
pub struct SqliteItemStore {
    conn: Connection,
}

impl SqliteItemStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, PersistenceError> {
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    /// Inserts or replaces items for `user_id`. Existing rows keep their
    /// position in the candidate order.
    pub fn upsert_items(
        &mut self,
        user_id: &str,
        items: &[StoredItem],
    ) -> Result<usize, PersistenceError> {
        let tx = self.conn.transaction()?;

        for stored in items {
            tx.execute(
                "INSERT INTO items (user_id, item_id, name, price, priority, acquired)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id, item_id) DO UPDATE SET
                    name = excluded.name,
                    price = excluded.price,
                    priority = excluded.priority,
                    acquired = excluded.acquired",
                params![
                    user_id,
                    stored.item.id.as_str(),
                    stored.item.name.as_str(),
                    stored.item.price,
                    stored.item.priority,
                    stored.acquired,
                ],
            )?;

            tx.execute(
                "DELETE FROM item_groups WHERE user_id = ?1 AND item_id = ?2",
                params![user_id, stored.item.id.as_str()],
            )?;
            for group_id in &stored.group_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO item_groups (user_id, item_id, group_id)
                     VALUES (?1, ?2, ?3)",
                    params![user_id, stored.item.id.as_str(), group_id.as_str()],
                )?;
            }
        }

        tx.commit()?;
        Ok(items.len())
    }

    pub fn user_exists(&self, user_id: &str) -> Result<bool, PersistenceError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM items WHERE user_id = ?1)",
            params![user_id],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    pub fn load_candidates(
        &self,
        user_id: &str,
        filter: &CandidateFilter,
    ) -> Result<Vec<ScorableItem>, PersistenceError> {
        let group_ids_json = serde_json::to_string(&filter.group_ids)?;

        let mut stmt = self.conn.prepare(
            "SELECT i.item_id, i.name, i.price, i.priority
             FROM items i
             WHERE i.user_id = ?1
               AND i.acquired = 0
               AND i.price > 0
               AND (?2 IS NULL OR i.price <= ?2)
               AND (
                   json_array_length(?3) = 0
                   OR EXISTS (
                       SELECT 1
                       FROM item_groups g
                       WHERE g.user_id = i.user_id
                         AND g.item_id = i.item_id
                         AND g.group_id IN (SELECT value FROM json_each(?3))
                   )
               )
             ORDER BY i.rowid ASC",
        )?;

        let rows = stmt.query_map(
            params![user_id, filter.max_price, group_ids_json],
            |row| {
                Ok(ScorableItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    priority: row.get(3)?,
                })
            },
        )?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        Ok(items)
    }

    pub fn load_all_unacquired(
        &self,
        user_id: &str,
    ) -> Result<Vec<ScorableItem>, PersistenceError> {
        self.load_candidates(user_id, &CandidateFilter::default())
    }

    fn configure(&mut self) -> Result<(), PersistenceError> {
        self.conn
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS items (
                user_id TEXT NOT NULL,
                item_id TEXT NOT NULL,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                priority REAL NOT NULL,
                acquired INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, item_id)
            );

            CREATE TABLE IF NOT EXISTS item_groups (
                user_id TEXT NOT NULL,
                item_id TEXT NOT NULL,
                group_id TEXT NOT NULL,
                PRIMARY KEY (user_id, item_id, group_id),
                FOREIGN KEY (user_id, item_id) REFERENCES items(user_id, item_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_items_user_acquired ON items(user_id, acquired);
            CREATE INDEX IF NOT EXISTS idx_item_groups_user_group ON item_groups(user_id, group_id);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, name) VALUES(1, 'items_v1')",
            [],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: &str, price: f64, priority: f64, groups: &[&str]) -> StoredItem {
        StoredItem::new(ScorableItem::new(id, format!("item {id}"), price, priority))
            .in_groups(groups.iter().copied())
    }

    fn seeded_store() -> SqliteItemStore {
        let mut store = SqliteItemStore::open_in_memory().expect("in-memory store");
        store
            .upsert_items(
                "user_1",
                &[
                    stored("desk", 120.0, 4.0, &["office"]),
                    stored("lamp", 30.0, 2.0, &["office", "living"]),
                    stored("sofa", 900.0, 5.0, &["living"]),
                    stored("kettle", 25.0, 3.0, &[]).acquired(),
                    stored("voucher", 0.0, 1.0, &["office"]),
                ],
            )
            .expect("seed user_1");
        store
            .upsert_items("user_2", &[stored("bike", 400.0, 4.0, &["office"])])
            .expect("seed user_2");
        store
    }

    fn ids(items: &[ScorableItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn loads_unacquired_priced_items_in_insertion_order() {
        let store = seeded_store();
        let items = store.load_all_unacquired("user_1").expect("load");
        assert_eq!(ids(&items), vec!["desk", "lamp", "sofa"]);
    }

    #[test]
    fn group_filter_matches_any_group_once() {
        let store = seeded_store();
        let filter = CandidateFilter {
            group_ids: vec!["office".to_string(), "living".to_string()],
            max_price: None,
        };
        let items = store.load_candidates("user_1", &filter).expect("load");
        assert_eq!(ids(&items), vec!["desk", "lamp", "sofa"]);

        let filter = CandidateFilter {
            group_ids: vec!["living".to_string()],
            max_price: None,
        };
        let items = store.load_candidates("user_1", &filter).expect("load");
        assert_eq!(ids(&items), vec!["lamp", "sofa"]);
    }

    #[test]
    fn price_threshold_is_inclusive() {
        let store = seeded_store();
        let filter = CandidateFilter {
            group_ids: Vec::new(),
            max_price: Some(120.0),
        };
        let items = store.load_candidates("user_1", &filter).expect("load");
        assert_eq!(ids(&items), vec!["desk", "lamp"]);
    }

    #[test]
    fn upsert_keeps_position_and_replaces_groups() {
        let mut store = seeded_store();
        store
            .upsert_items("user_1", &[stored("desk", 150.0, 4.5, &["living"])])
            .expect("update desk");

        let all = store.load_all_unacquired("user_1").expect("load");
        assert_eq!(ids(&all), vec!["desk", "lamp", "sofa"]);
        assert_eq!(all[0].price, 150.0);

        let office = CandidateFilter {
            group_ids: vec!["office".to_string()],
            max_price: None,
        };
        let items = store.load_candidates("user_1", &office).expect("load");
        assert_eq!(ids(&items), vec!["lamp"]);
    }

    #[test]
    fn users_are_isolated() {
        let store = seeded_store();
        assert!(store.user_exists("user_2").expect("exists"));
        assert!(!store.user_exists("user_3").expect("exists"));
        let items = store.load_all_unacquired("user_2").expect("load");
        assert_eq!(ids(&items), vec!["bike"]);
    }
}
