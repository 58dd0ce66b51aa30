//! Domain events reflecting listing state mutations.
//!
//! Every state change emits a [`ListingEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers (the
//! admin dashboard refreshes live off them) and optionally appended to the
//! PostgreSQL event log.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::ListingId;
use super::listing::ListingKind;

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ListingEvent {
    /// Emitted when a new listing is created.
    ListingCreated {
        /// Listing identifier.
        listing_id: ListingId,
        /// Kind of sales opportunity.
        kind: ListingKind,
        /// Display name.
        name: String,
        /// City the listing is in.
        city: String,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after any edit to an existing listing.
    ListingUpdated {
        /// Listing identifier.
        listing_id: ListingId,
        /// Display name after the edit.
        name: String,
        /// Update timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a listing is removed.
    ListingRemoved {
        /// Listing identifier.
        listing_id: ListingId,
        /// Removal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a previously-TBA listing gains a concrete schedule.
    ScheduleAnnounced {
        /// Listing identifier.
        listing_id: ListingId,
        /// The pattern string now in effect, if any.
        recurring_pattern: Option<String>,
        /// Season start now in effect, if any.
        season_start_date: Option<NaiveDate>,
        /// Season end now in effect, if any.
        season_end_date: Option<NaiveDate>,
        /// Announcement timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ListingEvent {
    /// Returns the listing ID associated with this event.
    #[must_use]
    pub fn listing_id(&self) -> ListingId {
        match self {
            Self::ListingCreated { listing_id, .. }
            | Self::ListingUpdated { listing_id, .. }
            | Self::ListingRemoved { listing_id, .. }
            | Self::ScheduleAnnounced { listing_id, .. } => *listing_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ListingCreated { .. } => "listing_created",
            Self::ListingUpdated { .. } => "listing_updated",
            Self::ListingRemoved { .. } => "listing_removed",
            Self::ScheduleAnnounced { .. } => "schedule_announced",
        }
    }
}
