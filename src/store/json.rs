//! File-backed record store.
//!
//! Persists the whole table as one JSON document in the store directory.
//! A missing file reads as an empty table, so first launch needs no
//! setup step.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{StoreError, UserStore};
use crate::models::UserRecord;

/// Store file name inside the store directory.
const STORE_FILE: &str = "users.json";

/// The on-disk table: records keyed by uuid plus the time of the last
/// feed refresh. Favorite updates do not re-stamp `updated_at`; it
/// tracks how old the feed data is, not the flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTable {
    records: HashMap<String, UserRecord>,
    updated_at: DateTime<Utc>,
}

impl StoredTable {
    fn empty() -> Self {
        Self {
            records: HashMap::new(),
            updated_at: Utc::now(),
        }
    }

    fn age_minutes(&self) -> i64 {
        (Utc::now() - self.updated_at).num_minutes()
    }

    fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

pub struct JsonStore {
    store_dir: PathBuf,
}

impl JsonStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&store_dir)?;
        Ok(Self { store_dir })
    }

    fn store_path(&self) -> PathBuf {
        self.store_dir.join(STORE_FILE)
    }

    fn load_table(&self) -> Result<StoredTable, StoreError> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(StoredTable::empty());
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_table(&self, table: &StoredTable) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(table)?;
        std::fs::write(self.store_path(), contents)?;
        Ok(())
    }

    /// Human-readable age of the cached feed data ("just now", "5m ago",
    /// "never"), for status surfaces.
    pub fn last_updated(&self) -> String {
        if !self.store_path().exists() {
            return "never".to_string();
        }
        match self.load_table() {
            Ok(table) => table.age_display(),
            Err(e) => {
                debug!(error = %e, "failed to read store for age display");
                "never".to_string()
            }
        }
    }
}

impl UserStore for JsonStore {
    async fn all(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.load_table()?.records.into_values().collect())
    }

    async fn by_page(&self, page: usize) -> Result<Vec<UserRecord>, StoreError> {
        let table = self.load_table()?;
        Ok(table
            .records
            .into_values()
            .filter(|u| u.page == page)
            .collect())
    }

    async fn favorites(&self) -> Result<Vec<UserRecord>, StoreError> {
        let table = self.load_table()?;
        Ok(table.records.into_values().filter(|u| u.favorite).collect())
    }

    async fn upsert_many(&self, records: &[UserRecord]) -> Result<(), StoreError> {
        let mut table = self.load_table()?;
        for record in records {
            table.records.insert(record.uuid.clone(), record.clone());
        }
        table.updated_at = Utc::now();
        debug!(count = records.len(), "upserted records into store");
        self.save_table(&table)
    }

    async fn set_favorite(&self, uuid: &str, favorite: bool) -> Result<(), StoreError> {
        let mut table = self.load_table()?;
        let record = table
            .records
            .get_mut(uuid)
            .ok_or_else(|| StoreError::UnknownUser(uuid.to_string()))?;
        record.favorite = favorite;
        self.save_table(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(uuid: &str, page: usize, favorite: bool) -> UserRecord {
        UserRecord {
            uuid: uuid.to_string(),
            first: format!("First{}", uuid),
            last: format!("Last{}", uuid),
            email: format!("{}@example.com", uuid),
            thumbnail: String::new(),
            page,
            favorite,
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.all().await.unwrap().is_empty());
        assert_eq!(store.last_updated(), "never");
    }

    #[tokio::test]
    async fn test_upsert_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
            store
                .upsert_many(&[user("u1", 1, false), user("u2", 2, true)])
                .await
                .unwrap();
        }

        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        let mut all = store.all().await.unwrap();
        all.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].uuid, "u1");
        assert_eq!(store.last_updated(), "just now");
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_uuid() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        store.upsert_many(&[user("u1", 1, false)]).await.unwrap();
        let mut replacement = user("u1", 1, false);
        replacement.first = "Renamed".to_string();
        store.upsert_many(&[replacement]).await.unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first, "Renamed");
    }

    #[tokio::test]
    async fn test_secondary_queries() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        store
            .upsert_many(&[
                user("u1", 1, true),
                user("u2", 1, false),
                user("u3", 2, true),
            ])
            .await
            .unwrap();

        assert_eq!(store.by_page(1).await.unwrap().len(), 2);
        assert_eq!(store.by_page(9).await.unwrap().len(), 0);
        assert_eq!(store.favorites().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_favorite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        store.upsert_many(&[user("u1", 1, false)]).await.unwrap();

        store.set_favorite("u1", true).await.unwrap();
        assert_eq!(store.favorites().await.unwrap().len(), 1);
        store.set_favorite("u1", false).await.unwrap();
        assert!(store.favorites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_favorite_unknown_uuid_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        let err = store.set_favorite("ghost", true).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownUser(_)));
    }

    #[test]
    fn test_age_display_buckets() {
        let mut table = StoredTable::empty();
        assert_eq!(table.age_display(), "just now");

        table.updated_at = Utc::now() - Duration::minutes(5);
        assert_eq!(table.age_display(), "5m ago");

        table.updated_at = Utc::now() - Duration::hours(3);
        assert_eq!(table.age_display(), "3h ago");

        table.updated_at = Utc::now() - Duration::days(2);
        assert_eq!(table.age_display(), "2d ago");
    }
}
