//! Listing-related DTOs for create, update, get, and list operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::listing::{Listing, ListingKind, ScheduleSegment};
use crate::domain::ListingId;

/// Request body for `POST /listings`.
///
/// Date fields are strings in `YYYY-MM-DD` form; values that fail to parse
/// are stored as absent bounds rather than rejected.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateListingRequest {
    /// Kind discriminator: `"market"` or `"consignment"`.
    pub kind: String,
    /// Display name (required, non-empty).
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or region code.
    #[serde(default)]
    pub region: String,
    /// Season start date string.
    #[serde(default)]
    pub season_start_date: Option<String>,
    /// Season end date string.
    #[serde(default)]
    pub season_end_date: Option<String>,
    /// Legacy start date string.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Legacy end date string.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Tri-state recurrence flag.
    #[serde(default)]
    pub is_recurring: Option<bool>,
    /// Recurrence pattern string in the admin-UI grammar.
    #[serde(default)]
    pub recurring_pattern: Option<String>,
    /// Schedule not yet announced.
    #[serde(default)]
    pub is_schedule_tba: bool,
    /// Display-only exception segments.
    #[serde(default)]
    pub additional_schedules: Vec<ScheduleSegment>,
}

/// Request body for `PATCH /listings/{id}`.
///
/// Omitted fields are left unchanged. For the clearable string-typed
/// fields, sending an empty string clears the stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateListingRequest {
    /// New kind discriminator.
    #[serde(default)]
    pub kind: Option<String>,
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New street address.
    #[serde(default)]
    pub address: Option<String>,
    /// New city.
    #[serde(default)]
    pub city: Option<String>,
    /// New region code.
    #[serde(default)]
    pub region: Option<String>,
    /// New season start date string; empty clears.
    #[serde(default)]
    pub season_start_date: Option<String>,
    /// New season end date string; empty clears.
    #[serde(default)]
    pub season_end_date: Option<String>,
    /// New legacy start date string; empty clears.
    #[serde(default)]
    pub start_date: Option<String>,
    /// New legacy end date string; empty clears.
    #[serde(default)]
    pub end_date: Option<String>,
    /// New recurrence flag.
    #[serde(default)]
    pub is_recurring: Option<bool>,
    /// New pattern string; empty clears.
    #[serde(default)]
    pub recurring_pattern: Option<String>,
    /// New TBA flag.
    #[serde(default)]
    pub is_schedule_tba: Option<bool>,
    /// Replacement exception-segment list.
    #[serde(default)]
    pub additional_schedules: Option<Vec<ScheduleSegment>>,
}

/// Full listing detail for create and get responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingResponse {
    /// Listing identifier.
    pub listing_id: ListingId,
    /// Kind of sales opportunity.
    pub kind: ListingKind,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub region: String,
    /// Season start (inclusive).
    pub season_start_date: Option<NaiveDate>,
    /// Season end (inclusive).
    pub season_end_date: Option<NaiveDate>,
    /// Legacy start-date fallback.
    pub start_date: Option<NaiveDate>,
    /// Legacy end-date fallback.
    pub end_date: Option<NaiveDate>,
    /// Tri-state recurrence flag.
    pub is_recurring: Option<bool>,
    /// Recurrence pattern string.
    pub recurring_pattern: Option<String>,
    /// Schedule not yet announced.
    pub is_schedule_tba: bool,
    /// Display-only exception segments.
    pub additional_schedules: Vec<ScheduleSegment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            listing_id: listing.listing_id,
            kind: listing.kind,
            name: listing.name,
            description: listing.description,
            address: listing.address,
            city: listing.city,
            region: listing.region,
            season_start_date: listing.season_start_date,
            season_end_date: listing.season_end_date,
            start_date: listing.start_date,
            end_date: listing.end_date,
            is_recurring: listing.is_recurring,
            recurring_pattern: listing.recurring_pattern,
            is_schedule_tba: listing.is_schedule_tba,
            additional_schedules: listing.additional_schedules,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

/// Listing summary for list responses, annotated with its next occurrence.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingSummaryDto {
    /// Listing identifier.
    pub listing_id: ListingId,
    /// Kind of sales opportunity.
    pub kind: ListingKind,
    /// Display name.
    pub name: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub region: String,
    /// Recurrence pattern string, if any.
    pub recurring_pattern: Option<String>,
    /// Effective season start after legacy fallback.
    pub season_start_date: Option<NaiveDate>,
    /// Effective season end after legacy fallback.
    pub season_end_date: Option<NaiveDate>,
    /// Schedule not yet announced.
    pub is_schedule_tba: bool,
    /// Next active date on or after the query anchor, if any.
    pub next_occurrence: Option<NaiveDate>,
}

impl ListingSummaryDto {
    /// Builds a summary, annotating the next occurrence from `anchor`.
    #[must_use]
    pub fn from_listing(listing: &Listing, anchor: NaiveDate) -> Self {
        Self {
            listing_id: listing.listing_id,
            kind: listing.kind,
            name: listing.name.clone(),
            city: listing.city.clone(),
            region: listing.region.clone(),
            recurring_pattern: listing.recurring_pattern.clone(),
            season_start_date: listing.effective_start(),
            season_end_date: listing.effective_end(),
            is_schedule_tba: listing.is_schedule_tba,
            next_occurrence: listing.next_occurrence_on_or_after(anchor),
        }
    }
}

/// Paginated list response for `GET /listings`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingListResponse {
    /// Listing summaries.
    pub data: Vec<ListingSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Filter query parameters for `GET /listings`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListingQueryParams {
    /// Case-insensitive substring over name, description, and city.
    #[serde(default)]
    pub q: Option<String>,
    /// Restrict to one kind: `"market"` or `"consignment"`.
    #[serde(default)]
    pub kind: Option<String>,
    /// Restrict to one city.
    #[serde(default)]
    pub city: Option<String>,
    /// Restrict to listings active on this date (`YYYY-MM-DD`). An
    /// unparseable value imposes no restriction.
    #[serde(default)]
    pub active_on: Option<String>,
}
