use crate::errors::{AppError, AppResult};
use crate::models::{CardSize, FileRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

const RECORDS_KEY: &str = "files";
const CARD_SIZE_KEY: &str = "card-size";

/// Persistent key-value store backing the catalog. The full record collection
/// lives under a single entry and is rewritten wholesale on every mutation;
/// a second entry holds the display-size preference.
#[derive(Debug)]
pub struct Store {
    conn: Mutex<Connection>,
    version: AtomicU64,
}

impl Store {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
            version: AtomicU64::new(0),
        })
    }

    /// Monotonic counter bumped by every collection write. Lets callers tell
    /// whether a cached derivation of the collection is still current.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Loads the full record collection. Missing or unparseable prior data
    /// yields an empty collection rather than an error.
    pub fn load_records(&self) -> AppResult<Vec<FileRecord>> {
        match self.read_value(RECORDS_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<FileRecord>>(&raw) {
                Ok(records) => Ok(records),
                Err(error) => {
                    tracing::warn!(error = %error, "stored record collection failed to parse, starting empty");
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    /// Persists the full collection. Every mutating operation is expressed as
    /// "compute new full collection, persist it".
    pub fn replace_records(&self, records: &[FileRecord]) -> AppResult<()> {
        self.write_value(RECORDS_KEY, &serde_json::to_string(records)?)?;
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    pub fn card_size(&self) -> AppResult<CardSize> {
        match self.read_value(CARD_SIZE_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_default()),
            None => Ok(CardSize::default()),
        }
    }

    pub fn set_card_size(&self, size: CardSize) -> AppResult<()> {
        self.write_value(CARD_SIZE_KEY, &serde_json::to_string(&size)?)
    }

    fn read_value(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        let raw = conn
            .query_row("SELECT value_json FROM kv WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(raw)
    }

    fn write_value(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("store mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO kv (key, value_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::models::{CardSize, FileRecord};

    fn open_temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Store::open(&dir.path().join("catalog.db")).expect("open store");
        (dir, store)
    }

    #[test]
    fn empty_store_loads_no_records() {
        let (_dir, store) = open_temp_store();
        assert!(store.load_records().expect("load").is_empty());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn replace_persists_and_bumps_version() {
        let (_dir, store) = open_temp_store();
        let records = vec![FileRecord {
            id: "1".to_string(),
            name: "A".to_string(),
            path: "/a".to_string(),
            tags: vec!["x".to_string()],
            ..Default::default()
        }];
        store.replace_records(&records).expect("replace");
        assert_eq!(store.version(), 1);
        assert_eq!(store.load_records().expect("load"), records);
    }

    #[test]
    fn corrupt_collection_loads_empty() {
        let (_dir, store) = open_temp_store();
        store
            .write_value("files", "not json at all")
            .expect("write raw");
        assert!(store.load_records().expect("load").is_empty());
    }

    #[test]
    fn card_size_round_trips_with_default() {
        let (_dir, store) = open_temp_store();
        assert_eq!(store.card_size().expect("default"), CardSize::Medium);
        store.set_card_size(CardSize::Xsmall).expect("set");
        assert_eq!(store.card_size().expect("get"), CardSize::Xsmall);
    }
}
