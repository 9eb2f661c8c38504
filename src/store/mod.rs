//! Local persistent storage for user records.
//!
//! The store is a durable table keyed by user uuid, queryable by the
//! secondary attributes the directory needs (origin page, favorite
//! flag). `JsonStore` persists the table to disk and survives process
//! restarts; `MemoryStore` backs tests.

pub mod json;
pub mod memory;

use thiserror::Error;

use crate::models::UserRecord;

pub use json::JsonStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("no stored user with uuid {0}")]
    UnknownUser(String),
}

/// Abstract interface for the record table.
///
/// Implementations must tolerate concurrent independent key updates:
/// `set_favorite` calls for distinct uuids may be in flight at the same
/// time.
#[allow(async_fn_in_trait)]
pub trait UserStore {
    /// All stored records.
    async fn all(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Records fetched from the given feed page.
    async fn by_page(&self, page: usize) -> Result<Vec<UserRecord>, StoreError>;

    /// Records currently flagged as favorites.
    async fn favorites(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Insert or replace records by uuid.
    async fn upsert_many(&self, records: &[UserRecord]) -> Result<(), StoreError>;

    /// Update the favorite flag of a single stored record.
    async fn set_favorite(&self, uuid: &str, favorite: bool) -> Result<(), StoreError>;
}
