//! In-memory record store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{StoreError, UserStore};
use crate::models::UserRecord;

/// In-memory implementation of the record table.
///
/// Locks are held only across the synchronous body of each method, so
/// concurrent key updates cannot deadlock. Writes can be made to fail
/// on demand to exercise error paths.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, UserRecord>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the table.
    pub fn seed(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let store = Self::default();
        {
            let mut map = store.records.lock().unwrap();
            for record in records {
                map.insert(record.uuid.clone(), record);
            }
        }
        store
    }

    /// Make subsequent writes fail, for error-path tests.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            Err(StoreError::Io(std::io::Error::other(
                "simulated write failure",
            )))
        } else {
            Ok(())
        }
    }
}

impl UserStore for MemoryStore {
    async fn all(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn by_page(&self, page: usize) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.page == page)
            .cloned()
            .collect())
    }

    async fn favorites(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.favorite)
            .cloned()
            .collect())
    }

    async fn upsert_many(&self, records: &[UserRecord]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut map = self.records.lock().unwrap();
        for record in records {
            map.insert(record.uuid.clone(), record.clone());
        }
        Ok(())
    }

    async fn set_favorite(&self, uuid: &str, favorite: bool) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut map = self.records.lock().unwrap();
        let record = map
            .get_mut(uuid)
            .ok_or_else(|| StoreError::UnknownUser(uuid.to_string()))?;
        record.favorite = favorite;
        Ok(())
    }
}
