//! Schedule query handlers: next occurrence and calendar grid.
//!
//! Both endpoints call through [`crate::schedule`] via the service so every
//! consumer surface shares identical matching semantics.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CalendarDayDto, CalendarParams, CalendarResponse, NextOccurrenceParams,
    NextOccurrenceResponse,
};
use crate::app_state::AppState;
use crate::domain::ListingId;
use crate::error::{DirectoryError, ErrorResponse};
use crate::schedule::parse_date_lenient;

/// `GET /listings/:id/next-occurrence` — Next active date for a listing.
///
/// # Errors
///
/// Returns [`DirectoryError::ListingNotFound`] if the listing does not
/// exist.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}/next-occurrence",
    tag = "Schedule",
    summary = "Next active date",
    description = "Returns the first date on or after the anchor on which the listing is active, or null for TBA listings, listings without a start date, and seasons already over.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
        NextOccurrenceParams,
    ),
    responses(
        (status = 200, description = "Next occurrence (possibly null)", body = NextOccurrenceResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn next_occurrence(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(params): Query<NextOccurrenceParams>,
) -> Result<impl IntoResponse, DirectoryError> {
    let listing_id = ListingId::from_uuid(id);
    let from = params
        .from
        .as_deref()
        .and_then(parse_date_lenient)
        .unwrap_or_else(|| Utc::now().date_naive());

    let next = state.listing_service.next_occurrence(listing_id, from).await?;

    Ok(Json(NextOccurrenceResponse {
        listing_id,
        from,
        next_occurrence: next,
    }))
}

/// `GET /calendar` — Active-listing counts for every day of a month.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidRequest`] when the month is out of
/// range.
#[utoipa::path(
    get,
    path = "/api/v1/calendar",
    tag = "Schedule",
    summary = "Monthly calendar counts",
    description = "Returns, for each day of the requested month, the number of listings active that day. Backs the calendar grid view.",
    params(CalendarParams),
    responses(
        (status = 200, description = "Per-day counts", body = CalendarResponse),
        (status = 400, description = "Month out of range", body = ErrorResponse),
    )
)]
pub async fn calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> Result<impl IntoResponse, DirectoryError> {
    let counts = state
        .listing_service
        .calendar_counts(params.year, params.month)
        .await?;

    let days = counts
        .into_iter()
        .map(|(date, active_count)| CalendarDayDto { date, active_count })
        .collect();

    Ok(Json(CalendarResponse {
        year: params.year,
        month: params.month,
        days,
    }))
}

/// Schedule query routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/listings/{id}/next-occurrence", get(next_occurrence))
        .route("/calendar", get(calendar))
}
