//! Database models for listing rows and stored events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A listing row from the `listings` table.
///
/// The full listing record is stored as JSONB in `data`; the extracted
/// columns exist for indexing and ad-hoc queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRow {
    /// Listing identifier (primary key).
    pub listing_id: Uuid,
    /// Kind discriminator string.
    pub kind: String,
    /// Display name.
    pub name: String,
    /// City.
    pub city: String,
    /// Full listing record as JSONB.
    pub data: serde_json::Value,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A stored event row from the `listing_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Listing that generated the event.
    pub listing_id: Uuid,
    /// Event type discriminator (e.g. `"listing_created"`).
    pub event_type: String,
    /// JSONB payload with event-specific data.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}
