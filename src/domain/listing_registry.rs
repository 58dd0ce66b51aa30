//! Concurrent listing storage with per-listing fine-grained locking.
//!
//! [`ListingRegistry`] stores all listings in a `HashMap` where each entry
//! is individually protected by a [`tokio::sync::RwLock`]. This allows
//! concurrent reads on the same listing and concurrent writes on different
//! listings.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::Listing;
use super::ListingId;
use crate::error::DirectoryError;

/// Central in-memory store for all listings.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<Listing>>` for fine-grained per-listing locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same listing concurrently.
/// - Writes to different listings are concurrent.
/// - Writes to the same listing are serialized.
#[derive(Debug)]
pub struct ListingRegistry {
    listings: RwLock<HashMap<ListingId, Arc<RwLock<Listing>>>>,
}

impl ListingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new listing into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidRequest`] if a listing with the
    /// same ID already exists (should never happen with UUID v4).
    pub async fn insert(&self, listing: Listing) -> Result<ListingId, DirectoryError> {
        let listing_id = listing.listing_id;
        let mut map = self.listings.write().await;
        if map.contains_key(&listing_id) {
            return Err(DirectoryError::InvalidRequest(format!(
                "listing {listing_id} already exists"
            )));
        }
        map.insert(listing_id, Arc::new(RwLock::new(listing)));
        Ok(listing_id)
    }

    /// Returns a shared reference to the listing behind its per-entry lock.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::ListingNotFound`] if no listing with the
    /// given ID exists.
    pub async fn get(&self, listing_id: ListingId) -> Result<Arc<RwLock<Listing>>, DirectoryError> {
        let map = self.listings.read().await;
        map.get(&listing_id)
            .cloned()
            .ok_or(DirectoryError::ListingNotFound(*listing_id.as_uuid()))
    }

    /// Removes a listing from the registry, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::ListingNotFound`] if no listing with the
    /// given ID exists.
    pub async fn remove(&self, listing_id: ListingId) -> Result<Listing, DirectoryError> {
        let mut map = self.listings.write().await;
        let arc = map
            .remove(&listing_id)
            .ok_or(DirectoryError::ListingNotFound(*listing_id.as_uuid()))?;
        // We just removed the entry, so after the map write lock drops we
        // should hold the only strong ref. Fall back to a clone if a reader
        // still holds one.
        match Arc::try_unwrap(arc) {
            Ok(lock) => Ok(lock.into_inner()),
            Err(arc) => Ok(arc.read().await.clone()),
        }
    }

    /// Returns a snapshot of every listing, cloned out of the registry.
    pub async fn list(&self) -> Vec<Listing> {
        let map = self.listings.read().await;
        let mut listings = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            listings.push(entry_lock.read().await.clone());
        }
        listings
    }

    /// Returns the number of listings in the registry.
    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }

    /// Returns `true` if the registry contains no listings.
    pub async fn is_empty(&self) -> bool {
        self.listings.read().await.is_empty()
    }
}

impl Default for ListingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::listing::ListingKind;
    use chrono::Utc;

    fn make_listing(name: &str) -> Listing {
        let now = Utc::now();
        Listing {
            listing_id: ListingId::new(),
            kind: ListingKind::Market,
            name: name.to_string(),
            description: String::new(),
            address: String::new(),
            city: "Elkhorn".to_string(),
            region: "WI".to_string(),
            season_start_date: None,
            season_end_date: None,
            start_date: None,
            end_date: None,
            is_recurring: None,
            recurring_pattern: None,
            is_schedule_tba: false,
            additional_schedules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = ListingRegistry::new();
        let listing = make_listing("Sunday Flea");
        let id = listing.listing_id;

        let result = registry.insert(listing).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap_or_default(), id);

        let fetched = registry.get(id).await;
        assert!(fetched.is_ok());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let registry = ListingRegistry::new();
        let listing = make_listing("Sunday Flea");
        let dup = listing.clone();

        let _ = registry.insert(listing).await;
        let result = registry.insert(dup).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = ListingRegistry::new();
        let result = registry.get(ListingId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remove_returns_listing() {
        let registry = ListingRegistry::new();
        let listing = make_listing("Sunday Flea");
        let id = listing.listing_id;

        let _ = registry.insert(listing).await;
        let removed = registry.remove(id).await;
        let Ok(removed) = removed else {
            panic!("remove failed");
        };
        assert_eq!(removed.name, "Sunday Flea");

        // Now it should be gone
        let result = registry.get(id).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remove_nonexistent_returns_error() {
        let registry = ListingRegistry::new();
        let result = registry.remove(ListingId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_returns_all() {
        let registry = ListingRegistry::new();
        let _ = registry.insert(make_listing("A")).await;
        let _ = registry.insert(make_listing("B")).await;

        let list = registry.list().await;
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = ListingRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.len().await, 0);

        let _ = registry.insert(make_listing("A")).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
    }
}
