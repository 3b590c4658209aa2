use anyhow::{Context, Result};
use log::info;

use crate::db::Database;

use super::{KeyValueStore, MemoryStore};

/// Write-through cache over the `kv` table. Reads never touch SQLite;
/// writes land in memory first and are queued to the DB thread.
pub struct SqliteKeyValueStore {
    cache: MemoryStore,
    db: Database,
}

impl SqliteKeyValueStore {
    pub async fn open(db: Database) -> Result<Self> {
        let entries = db
            .load_kv()
            .await
            .context("failed to load persisted state")?;

        let mut cache = MemoryStore::default();
        for entry in &entries {
            cache.set(&entry.key, entry.value.clone());
        }
        info!("Loaded {} persisted state entries", entries.len());

        Ok(Self { cache, db })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.cache.set(key, value.clone());
        self.db.put_kv_detached(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.cache.remove(key);
        self.db.delete_kv_detached(key.to_string());
    }

    fn keys(&self) -> Vec<String> {
        self.cache.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.sqlite3");

        {
            let db = Database::new(path.clone()).unwrap();
            let mut store = SqliteKeyValueStore::open(db.clone()).await.unwrap();
            store.set("erg-alert:neck", "42".into());
            store.set("alert-snooze:a", "7".into());
            store.remove("alert-snooze:a");
            assert_eq!(store.get("erg-alert:neck").as_deref(), Some("42"));
            db.flush().await.unwrap();
        }

        let db = Database::new(path).unwrap();
        let store = SqliteKeyValueStore::open(db).await.unwrap();
        assert_eq!(store.get("erg-alert:neck").as_deref(), Some("42"));
        assert_eq!(store.get("alert-snooze:a"), None);
    }
}
