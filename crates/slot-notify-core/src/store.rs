//! Selection store
//!
//! Holds the status each user picked in the first step until they pick a city.
//! Backed by a concurrent cache so handlers running on different tasks never
//! observe a torn entry; writes to the same user are serialized by the cache.

use crate::catalog::Status;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

/// Per-user status selections.
///
/// Entries are never removed explicitly. Without an idle TTL the store grows
/// with the number of distinct users for the lifetime of the process.
#[derive(Clone)]
pub struct SelectionStore {
    cache: Cache<i64, Status>,
}

impl SelectionStore {
    /// Creates an unbounded store with no expiry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    /// Creates a store whose entries expire after `idle` without being touched.
    #[must_use]
    pub fn with_idle_ttl(idle: Duration) -> Self {
        Self {
            cache: Cache::builder().time_to_idle(idle).build(),
        }
    }

    /// Records `status` for `user_id`, replacing any earlier selection.
    pub async fn set_status(&self, user_id: i64, status: Status) {
        debug!(user_id, %status, "Storing status selection");
        self.cache.insert(user_id, status).await;
    }

    /// Returns the stored status, or [`Status::Unknown`] if none was recorded.
    pub async fn get_status(&self, user_id: i64) -> Status {
        self.cache.get(&user_id).await.unwrap_or(Status::Unknown)
    }

    /// Number of users with a stored selection.
    ///
    /// Eventually consistent: pending cache maintenance may lag behind writes.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    #[cfg(test)]
    pub(crate) async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_yields_sentinel() {
        let store = SelectionStore::new();
        assert_eq!(store.get_status(42).await, Status::Unknown);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = SelectionStore::new();
        store.set_status(1, Status::Available).await;
        store.set_status(1, Status::NotAvailable).await;
        assert_eq!(store.get_status(1).await, Status::NotAvailable);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = SelectionStore::new();
        store.set_status(111, Status::Available).await;
        store.set_status(222, Status::NotAvailable).await;

        assert_eq!(store.get_status(111).await, Status::Available);
        assert_eq!(store.get_status(222).await, Status::NotAvailable);
    }

    #[tokio::test]
    async fn test_entry_count() {
        let store = SelectionStore::new();
        store.set_status(1, Status::Available).await;
        store.set_status(2, Status::Available).await;
        store.set_status(1, Status::NotAvailable).await;

        store.sync().await;

        assert_eq!(store.entry_count(), 2);
    }

    #[tokio::test]
    async fn test_idle_ttl_store_keeps_fresh_entries() {
        let store = SelectionStore::with_idle_ttl(Duration::from_secs(3600));
        store.set_status(7, Status::Available).await;
        assert_eq!(store.get_status(7).await, Status::Available);
    }
}
