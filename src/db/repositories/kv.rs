use anyhow::Result;
use chrono::Utc;
use rusqlite::params;

use crate::db::{helpers::parse_datetime, models::KvEntry, Database};

impl Database {
    /// Load every key/value row.
    pub async fn load_kv(&self) -> Result<Vec<KvEntry>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT key, value, updated_at FROM kv ORDER BY key")?;
            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(KvEntry {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    updated_at: parse_datetime(&row.get::<_, String>(2)?, "updated_at")?,
                });
            }
            Ok(entries)
        })
        .await
    }

    /// Insert or replace a row without waiting for the write.
    pub fn put_kv_detached(&self, key: String, value: String) {
        self.execute_detached("put_kv", move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        });
    }

    pub fn delete_kv_detached(&self, key: String) {
        self.execute_detached("delete_kv", move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detached_writes_are_visible_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("state.sqlite3")).unwrap();

        db.put_kv_detached("erg-alert:neck".into(), "100".into());
        db.put_kv_detached("erg-alert:neck".into(), "200".into());
        db.put_kv_detached("alert-snooze:x".into(), "5".into());
        db.delete_kv_detached("alert-snooze:x".into());
        db.flush().await.unwrap();

        let entries = db.load_kv().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "erg-alert:neck");
        assert_eq!(entries[0].value, "200");
    }
}
