//! Per-connection subscription manager.
//!
//! Tracks which listing IDs a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::ListingId;

/// Manages the set of listing subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed listing IDs. If `subscribe_all` is true, this set is
    /// ignored.
    listing_ids: HashSet<ListingId>,
    /// Whether the client subscribes to all listings (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds listing IDs to the subscription set. `"*"` enables the
    /// wildcard.
    pub fn subscribe(&mut self, ids: &[ListingId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.listing_ids.insert(*id);
        }
    }

    /// Removes listing IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[ListingId]) {
        for id in ids {
            self.listing_ids.remove(id);
        }
    }

    /// Returns `true` if the given listing ID matches the subscription
    /// filter.
    #[must_use]
    pub fn matches(&self, listing_id: ListingId) -> bool {
        self.subscribe_all || self.listing_ids.contains(&listing_id)
    }

    /// Returns the number of explicitly subscribed listing IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.listing_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
