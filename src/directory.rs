//! Directory state management.
//!
//! This module contains the `Directory` controller that owns the
//! canonical list of loaded users, the favorites index, and everything
//! the presentation layer observes: the visible page after
//! filter -> sort -> paginate, total page count, loading flag, error
//! message, and the search/sort/offline settings.
//!
//! The controller reconciles two collaborators behind traits: the
//! persistent record store ([`UserStore`]) and the remote feed
//! ([`UserSource`]). Loading is cache-first - the network is only
//! consulted when the store is empty, and a failed fetch degrades to
//! cached data or to an empty terminal state with a message, never to
//! an error returned to the caller.
//!
//! Two contract points for embedding applications:
//! - `set_offline` persists the flag and returns; it does not reload.
//!   Re-invoking `load` after the flag changes is the caller's job.
//! - a running `load` is never cancelled; if other operations are
//!   interleaved while it is suspended, whichever operation finishes
//!   last publishes last.

use std::collections::HashMap;

use futures::future;
use tracing::{debug, info, warn};

use crate::api::{ApiError, UserSource};
use crate::config::Config;
use crate::models::{SortDirection, SortField, UserRecord};
use crate::store::UserStore;
use crate::view::{self, PageView};

/// Number of records requested from the feed when the cache is empty.
/// One fetch seeds the whole directory; pagination is local after that.
pub const RESULTS_PER_FETCH: usize = 10;

/// Message shown when the feed is unreachable and nothing is cached.
pub const OFFLINE_NO_DATA: &str = "You are offline. No cached data available.";

/// Message shown when the feed is unreachable but cached records exist.
pub const OFFLINE_CACHED_DATA: &str = "You are offline. Showing cached data.";

/// Load-in-flight guard, owned by the instance so independent
/// directories (and tests) cannot interfere with each other.
/// Idle -> Loading on entry to `load`; back to Idle on every exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
}

/// Directory state container.
///
/// Fields are public for the presentation layer to read; all mutation
/// goes through the operations below.
pub struct Directory<S, F> {
    // Collaborators
    pub store: S,
    pub source: F,
    pub config: Config,

    /// Canonical list of loaded records, pre-derivation.
    pub users: Vec<UserRecord>,
    /// The visible page after filter -> sort -> paginate.
    pub paginated_users: Vec<UserRecord>,
    pub total_pages: usize,
    /// Current page, 1-based.
    pub page: usize,
    pub loading: bool,
    /// Human-readable message for the last failure; empty when healthy.
    pub error: String,
    /// Fast-lookup favorites index, kept in agreement with the
    /// persisted favorite flags.
    pub favorites: HashMap<String, bool>,
    pub show_only_favorites: bool,
    pub offline: bool,
    pub search_term: String,
    pub order_by: SortField,
    pub order_direction: SortDirection,

    load_state: LoadState,
}

impl<S: UserStore, F: UserSource> Directory<S, F> {
    /// Create a directory over the given collaborators. The offline
    /// flag is taken from the persisted config.
    pub fn new(store: S, source: F, config: Config) -> Self {
        let offline = config.offline;
        Self {
            store,
            source,
            config,
            users: Vec::new(),
            paginated_users: Vec::new(),
            total_pages: 1,
            page: 1,
            loading: false,
            error: String::new(),
            favorites: HashMap::new(),
            show_only_favorites: false,
            offline,
            search_term: String::new(),
            order_by: SortField::First,
            order_direction: SortDirection::Ascending,
            load_state: LoadState::Idle,
        }
    }

    /// Re-derive the visible state from the canonical list.
    ///
    /// Every mutating operation funnels through here so the
    /// filter -> sort -> paginate invariant holds after each transition.
    fn recompute(&mut self, page: usize) {
        self.page = page;
        let filtered = view::filter_users(&self.users, &self.search_term);
        let ordered = view::order_users(filtered, self.order_by, self.order_direction);
        let PageView { users, total_pages } = view::paginate(&ordered, page);
        self.paginated_users = users;
        self.total_pages = total_pages;
    }

    /// Load the directory, cache-first.
    ///
    /// A second call while one is in flight returns immediately with no
    /// store or network access. No automatic retry happens; calling
    /// `load` again is the only retry mechanism.
    pub async fn load(&mut self) {
        if self.load_state == LoadState::Loading {
            debug!("load already in flight, skipping");
            return;
        }
        self.load_state = LoadState::Loading;
        self.loading = true;
        self.error.clear();

        let mut all = match self.store.all().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to read user store, treating as empty");
                Vec::new()
            }
        };
        debug!(cached = all.len(), "records in store before fetch");

        if all.is_empty() {
            match self.fetch_and_persist().await {
                Ok(records) => all = records,
                Err(e) => {
                    if all.is_empty() {
                        warn!(error = %e, "feed unavailable with empty cache");
                        self.users = Vec::new();
                        self.paginated_users = Vec::new();
                        self.total_pages = 1;
                        self.page = 1;
                        self.loading = false;
                        self.error = OFFLINE_NO_DATA.to_string();
                        self.load_state = LoadState::Idle;
                        return;
                    }
                    warn!(error = %e, "feed unavailable, falling back to cache");
                    self.error = OFFLINE_CACHED_DATA.to_string();
                }
            }
        }

        self.favorites = favorites_index(&all);
        self.users = all;
        self.recompute(1);
        self.loading = false;
        self.load_state = LoadState::Idle;
    }

    /// Fetch page 1 from the feed and persist it. Honors the offline
    /// toggle by failing before any network access.
    async fn fetch_and_persist(&self) -> anyhow::Result<Vec<UserRecord>> {
        if self.offline {
            return Err(ApiError::Offline.into());
        }
        let raw = self.source.fetch_page(1, RESULTS_PER_FETCH).await?;
        let records: Vec<UserRecord> = raw.into_iter().map(|u| u.into_record(1)).collect();
        self.store.upsert_many(&records).await?;
        info!(count = records.len(), "fetched and cached feed page");
        Ok(records)
    }

    /// Update the search term and re-derive from page 1.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.recompute(1);
    }

    /// Update the sort field and re-derive from page 1.
    pub fn set_order_by(&mut self, field: SortField) {
        self.order_by = field;
        self.recompute(1);
    }

    /// Update the sort direction and re-derive from page 1.
    pub fn set_order_direction(&mut self, direction: SortDirection) {
        self.order_direction = direction;
        self.recompute(1);
    }

    /// Switch between the full directory and the favorites-only view.
    ///
    /// Re-reads the store either way, so the favorites view reflects
    /// persisted flags rather than the in-memory snapshot. A store
    /// error keeps the previous canonical list and surfaces the error.
    pub async fn set_show_only_favorites(&mut self, show: bool) {
        self.show_only_favorites = show;
        self.loading = true;
        self.error.clear();

        let read = if show {
            self.store.favorites().await
        } else {
            self.store.all().await
        };
        match read {
            Ok(records) => {
                self.users = records;
                self.recompute(1);
            }
            Err(e) => {
                warn!(error = %e, "failed to read user store");
                self.error = e.to_string();
            }
        }
        self.loading = false;
    }

    /// Jump to a page. The page number is not validated; out-of-range
    /// pages yield an empty visible slice.
    pub fn set_page(&mut self, page: usize) {
        self.recompute(page);
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages {
            self.set_page(self.page + 1);
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.set_page(self.page - 1);
        }
    }

    /// Flip a user's favorite flag: persist first, then update the
    /// index. A persist failure surfaces the error and leaves the
    /// index untouched.
    pub async fn toggle_favorite(&mut self, user: &UserRecord) {
        let now_favorite = !self.is_favorite(&user.uuid);
        if let Err(e) = self.store.set_favorite(&user.uuid, now_favorite).await {
            warn!(uuid = %user.uuid, error = %e, "failed to persist favorite flag");
            self.error = e.to_string();
            return;
        }
        self.favorites.insert(user.uuid.clone(), now_favorite);

        if self.show_only_favorites {
            // The visible set changed membership; re-read it.
            self.set_show_only_favorites(true).await;
        } else {
            self.recompute(self.page);
        }
    }

    /// Unmark every favorited user. Store updates run concurrently;
    /// the index is cleared only once all of them succeed. On a partial
    /// failure the index is resynced from whatever the store persisted.
    pub async fn clear_all_favorites(&mut self) {
        let ids: Vec<String> = self
            .favorites
            .iter()
            .filter(|(_, favorite)| **favorite)
            .map(|(uuid, _)| uuid.clone())
            .collect();

        let store = &self.store;
        let updates = ids.iter().map(|uuid| store.set_favorite(uuid, false));
        let results = future::join_all(updates).await;

        if let Some(e) = results.into_iter().find_map(Result::err) {
            warn!(error = %e, "failed to clear favorites");
            self.error = e.to_string();
            match self.store.favorites().await {
                Ok(records) => self.favorites = favorites_index(&records),
                Err(e) => warn!(error = %e, "failed to resync favorites index"),
            }
            return;
        }
        self.favorites.clear();

        if self.show_only_favorites {
            self.set_show_only_favorites(true).await;
        } else {
            self.recompute(self.page);
        }
    }

    /// Set the offline toggle and persist it. Does not reload; the
    /// embedding application decides when to re-invoke `load`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
        self.config.offline = offline;
        if let Err(e) = self.config.save() {
            warn!(error = %e, "failed to persist offline flag");
        }
    }

    /// Read-only favorites lookup for the presentation layer.
    pub fn is_favorite(&self, uuid: &str) -> bool {
        self.favorites.get(uuid).copied().unwrap_or(false)
    }
}

/// Build the favorites index from the favorite flags of the given
/// records.
fn favorites_index(records: &[UserRecord]) -> HashMap<String, bool> {
    records
        .iter()
        .filter(|u| u.favorite)
        .map(|u| (u.uuid.clone(), true))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::{FeedLogin, FeedName, FeedPicture, FeedUser};
    use crate::store::MemoryStore;

    struct StubFeed {
        users: Vec<FeedUser>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubFeed {
        fn with_users(count: usize) -> Self {
            Self {
                users: (0..count).map(feed_user).collect(),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                users: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl UserSource for StubFeed {
        async fn fetch_page(
            &self,
            _page: usize,
            results: usize,
        ) -> Result<Vec<FeedUser>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::from_status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    "stub feed down",
                ));
            }
            Ok(self.users.iter().take(results).cloned().collect())
        }
    }

    fn feed_user(n: usize) -> FeedUser {
        FeedUser {
            login: FeedLogin {
                uuid: format!("uuid-{}", n),
            },
            name: FeedName {
                title: None,
                first: format!("First{}", n),
                last: format!("Last{}", n),
            },
            email: format!("user{}@example.com", n),
            picture: FeedPicture {
                large: None,
                medium: None,
                thumbnail: format!("thumb{}.jpg", n),
            },
        }
    }

    fn record(uuid: &str, favorite: bool) -> UserRecord {
        UserRecord {
            uuid: uuid.to_string(),
            first: format!("First-{}", uuid),
            last: format!("Last-{}", uuid),
            email: format!("{}@example.com", uuid),
            thumbnail: String::new(),
            page: 1,
            favorite,
        }
    }

    fn directory(
        store: MemoryStore,
        source: StubFeed,
        dir: &tempfile::TempDir,
    ) -> Directory<MemoryStore, StubFeed> {
        let config = Config::load_from(dir.path().to_path_buf()).unwrap();
        Directory::new(store, source, config)
    }

    #[tokio::test]
    async fn test_load_guard_skips_reentry() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dir = directory(MemoryStore::new(), StubFeed::with_users(10), &tmp);

        dir.load_state = LoadState::Loading;
        dir.load().await;
        assert_eq!(dir.source.calls(), 0);
        assert!(!dir.loading);
        assert!(dir.users.is_empty());

        dir.load_state = LoadState::Idle;
        dir.load().await;
        assert_eq!(dir.source.calls(), 1);
        assert_eq!(dir.users.len(), 10);
    }

    #[tokio::test]
    async fn test_load_serves_from_cache_without_fetching() {
        let tmp = tempfile::tempdir().unwrap();
        let store = MemoryStore::seed([record("u1", true), record("u2", false)]);
        let mut dir = directory(store, StubFeed::with_users(10), &tmp);

        dir.load().await;
        assert_eq!(dir.source.calls(), 0);
        assert_eq!(dir.users.len(), 2);
        assert!(dir.is_favorite("u1"));
        assert!(!dir.is_favorite("u2"));
        assert_eq!(dir.error, "");
    }

    #[tokio::test]
    async fn test_second_load_hits_cache_not_network() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dir = directory(MemoryStore::new(), StubFeed::with_users(10), &tmp);

        dir.load().await;
        dir.load().await;
        assert_eq!(dir.source.calls(), 1);
        assert_eq!(dir.users.len(), 10);
    }

    #[tokio::test]
    async fn test_guard_released_after_terminal_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dir = directory(MemoryStore::new(), StubFeed::failing(), &tmp);

        dir.load().await;
        assert_eq!(dir.error, OFFLINE_NO_DATA);
        assert!(!dir.loading);
        assert_eq!(dir.total_pages, 1);
        assert_eq!(dir.page, 1);

        // The guard must be released; a retry reaches the feed again.
        dir.load().await;
        assert_eq!(dir.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_offline_skips_network_entirely() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dir = directory(MemoryStore::new(), StubFeed::with_users(10), &tmp);
        dir.set_offline(true);

        dir.load().await;
        assert_eq!(dir.source.calls(), 0);
        assert_eq!(dir.error, OFFLINE_NO_DATA);
        assert!(dir.users.is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_during_seed_is_terminal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let mut dir = directory(store, StubFeed::with_users(10), &tmp);

        dir.load().await;
        assert_eq!(dir.error, OFFLINE_NO_DATA);
        assert!(dir.users.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_favorite_persist_failure_keeps_index() {
        let tmp = tempfile::tempdir().unwrap();
        let store = MemoryStore::seed([record("u1", false)]);
        let mut dir = directory(store, StubFeed::with_users(0), &tmp);
        dir.load().await;

        dir.store.set_fail_writes(true);
        let user = dir.users[0].clone();
        dir.toggle_favorite(&user).await;
        assert!(!dir.error.is_empty());
        assert!(!dir.is_favorite("u1"));
    }

    #[tokio::test]
    async fn test_set_offline_persists_flag() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dir = directory(MemoryStore::new(), StubFeed::with_users(0), &tmp);
        dir.set_offline(true);

        let reloaded = Config::load_from(tmp.path().to_path_buf()).unwrap();
        assert!(reloaded.offline);
    }
}
