use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe record store: a durable mapping from a fixed collection key
/// to a JSON array of records. Callers treat it as opaque get/put; the
/// SQLite table underneath holds one row per collection.
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store, used for testing and as the offline
    /// fallback when the on-disk database cannot be opened at boot
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Read the record array stored under `key`. A key that has never been
    /// written returns `Ok(None)`; a stored value that fails to parse as a
    /// JSON array is an error the caller decides how to absorb.
    pub fn get(&self, key: &str) -> StoreResult<Option<Vec<Value>>> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = match conn.query_row(
            "SELECT value FROM collections WHERE key = ?1",
            params![key],
            |row| row.get(0),
        ) {
            Ok(value) => Some(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(StoreError::Database(e)),
        };

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Overwrite the record array stored under `key` in full. The first
    /// write for a key creates the collection.
    pub fn put(&self, key: &str, records: &[Value]) -> StoreResult<()> {
        let raw = serde_json::to_string(records)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO collections (key, value, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, raw, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_key_reads_as_none() {
        let store = Store::in_memory().unwrap();
        assert!(store.get("candles").unwrap().is_none());
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let store = Store::in_memory().unwrap();
        let records = vec![json!({"id": 1, "name": "Ada"})];

        store.put("candles", &records).unwrap();
        assert_eq!(store.get("candles").unwrap(), Some(records));
    }

    #[test]
    fn test_put_overwrites_wholesale() {
        let store = Store::in_memory().unwrap();
        store.put("lanterns", &[json!({"id": 1})]).unwrap();
        store.put("lanterns", &[]).unwrap();

        assert_eq!(store.get("lanterns").unwrap(), Some(vec![]));
    }

    #[test]
    fn test_keys_are_independent() {
        let store = Store::in_memory().unwrap();
        store.put("candles", &[json!({"id": 1})]).unwrap();

        assert!(store.get("flowers").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_value_surfaces_as_error() {
        let store = Store::in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO collections (key, value, updated_at) VALUES ('entries', 'not json', '')",
                [],
            )
            .unwrap();
        }

        assert!(matches!(store.get("entries"), Err(StoreError::Json(_))));
    }
}
