//! Schedule query DTOs: next occurrence and calendar grid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ListingId;

/// Query parameters for `GET /listings/{id}/next-occurrence`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct NextOccurrenceParams {
    /// Anchor date (`YYYY-MM-DD`). Defaults to today; an unparseable value
    /// also falls back to today.
    #[serde(default)]
    pub from: Option<String>,
}

/// Response body for `GET /listings/{id}/next-occurrence`.
#[derive(Debug, Serialize, ToSchema)]
pub struct NextOccurrenceResponse {
    /// Listing identifier.
    pub listing_id: ListingId,
    /// Anchor date the search started from.
    pub from: NaiveDate,
    /// First active date on or after the anchor, or `null` when none
    /// exists (TBA schedule, no start date, or season already over).
    pub next_occurrence: Option<NaiveDate>,
}

/// Query parameters for `GET /calendar`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CalendarParams {
    /// Calendar year (e.g. `2026`).
    pub year: i32,
    /// Calendar month (1–12).
    pub month: u32,
}

/// One day cell of the calendar grid.
#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarDayDto {
    /// The day.
    pub date: NaiveDate,
    /// Number of listings active on that day.
    pub active_count: usize,
}

/// Response body for `GET /calendar`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarResponse {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1–12).
    pub month: u32,
    /// One entry per day of the month, in order.
    pub days: Vec<CalendarDayDto>,
}
