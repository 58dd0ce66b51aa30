//! Listing CRUD handlers: create, list, get, update, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    CreateListingRequest, ListingListResponse, ListingQueryParams, ListingResponse,
    ListingSummaryDto, PaginationMeta, PaginationParams, UpdateListingRequest,
};
use crate::app_state::AppState;
use crate::domain::listing::ListingKind;
use crate::error::{DirectoryError, ErrorResponse};
use crate::schedule::parse_date_lenient;
use crate::service::{ListingDraft, ListingFilter, ListingPatch};

/// `POST /listings` — Create a new listing.
///
/// # Errors
///
/// Returns [`DirectoryError`] on an invalid kind or empty name.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    tag = "Listings",
    summary = "Create a new listing",
    description = "Creates a market or consignment-shop listing. Date strings that fail to parse are stored as absent bounds; a TBA listing has all date fields cleared.",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created successfully", body = ListingResponse),
        (status = 400, description = "Invalid kind or empty name", body = ErrorResponse),
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    Json(req): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, DirectoryError> {
    let draft = parse_create_request(req)?;
    let listing = state.listing_service.create_listing(draft).await?;
    Ok((StatusCode::CREATED, Json(ListingResponse::from(listing))))
}

/// `GET /listings` — List listings with filters and pagination.
///
/// Each summary is annotated with its next occurrence computed from today,
/// so the list view never re-implements the schedule math.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidListingKind`] on an unknown kind
/// filter.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    tag = "Listings",
    summary = "List listings",
    description = "Returns a paginated list of listings, optionally filtered by text query, kind, city, or an active-on date.",
    params(ListingQueryParams, PaginationParams),
    responses(
        (status = 200, description = "Paginated listing list", body = ListingListResponse),
        (status = 400, description = "Unknown kind filter", body = ErrorResponse),
    )
)]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(filters): Query<ListingQueryParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, DirectoryError> {
    let filter = parse_filter(&filters)?;
    let pagination = pagination.clamped();

    let listings = state.listing_service.search(&filter).await;
    let today = Utc::now().date_naive();

    let total = listings.len() as u32;
    let per_page = pagination.per_page;
    let page = pagination.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    let start = ((page - 1) * per_page) as usize;
    let data: Vec<ListingSummaryDto> = listings
        .iter()
        .skip(start)
        .take(per_page as usize)
        .map(|listing| ListingSummaryDto::from_listing(listing, today))
        .collect();

    Ok(Json(ListingListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /listings/:id` — Get listing details.
///
/// # Errors
///
/// Returns [`DirectoryError::ListingNotFound`] if the listing does not
/// exist.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    summary = "Get listing details",
    description = "Returns the full stored record for a single listing, including display-only exception segments.",
    params(
        ("id" = uuid::Uuid, Path, description = "Listing UUID"),
    ),
    responses(
        (status = 200, description = "Listing details", body = ListingResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, DirectoryError> {
    let listing_id = crate::domain::ListingId::from_uuid(id);
    let listing = state.listing_service.get_listing(listing_id).await?;
    Ok(Json(ListingResponse::from(listing)))
}

/// `PATCH /listings/:id` — Apply a partial update.
async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<impl IntoResponse, DirectoryError> {
    let listing_id = crate::domain::ListingId::from_uuid(id);
    let patch = parse_update_request(req)?;
    let listing = state
        .listing_service
        .update_listing(listing_id, patch)
        .await?;
    Ok(Json(ListingResponse::from(listing)))
}

/// `DELETE /listings/:id` — Remove a listing.
async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, DirectoryError> {
    let listing_id = crate::domain::ListingId::from_uuid(id);
    state.listing_service.remove_listing(listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Listing management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(list_listings).post(create_listing))
        .route(
            "/listings/{id}",
            get(get_listing).patch(update_listing).delete(delete_listing),
        )
}

// ── Request Parsing Helpers ─────────────────────────────────────────────

/// Parses a create request into a service draft.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidListingKind`] on an unknown kind
/// discriminator.
fn parse_create_request(req: CreateListingRequest) -> Result<ListingDraft, DirectoryError> {
    let kind = ListingKind::parse(&req.kind)
        .ok_or_else(|| DirectoryError::InvalidListingKind(req.kind.clone()))?;

    Ok(ListingDraft {
        kind,
        name: req.name,
        description: req.description,
        address: req.address,
        city: req.city,
        region: req.region,
        season_start_date: req.season_start_date.as_deref().and_then(parse_date_lenient),
        season_end_date: req.season_end_date.as_deref().and_then(parse_date_lenient),
        start_date: req.start_date.as_deref().and_then(parse_date_lenient),
        end_date: req.end_date.as_deref().and_then(parse_date_lenient),
        is_recurring: req.is_recurring,
        recurring_pattern: normalize_pattern(req.recurring_pattern),
        is_schedule_tba: req.is_schedule_tba,
        additional_schedules: req.additional_schedules,
    })
}

/// Parses an update request into a service patch.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidListingKind`] on an unknown kind
/// discriminator.
fn parse_update_request(req: UpdateListingRequest) -> Result<ListingPatch, DirectoryError> {
    let kind = match req.kind {
        Some(raw) => Some(
            ListingKind::parse(&raw).ok_or(DirectoryError::InvalidListingKind(raw))?,
        ),
        None => None,
    };

    Ok(ListingPatch {
        kind,
        name: req.name,
        description: req.description,
        address: req.address,
        city: req.city,
        region: req.region,
        season_start_date: req.season_start_date.as_deref().map(parse_date_lenient),
        season_end_date: req.season_end_date.as_deref().map(parse_date_lenient),
        start_date: req.start_date.as_deref().map(parse_date_lenient),
        end_date: req.end_date.as_deref().map(parse_date_lenient),
        is_recurring: req.is_recurring,
        recurring_pattern: req.recurring_pattern.map(|s| normalize_pattern(Some(s))),
        is_schedule_tba: req.is_schedule_tba,
        additional_schedules: req.additional_schedules,
    })
}

/// Treats empty and `"null"` pattern strings as absent.
fn normalize_pattern(raw: Option<String>) -> Option<String> {
    raw.filter(|s| {
        let trimmed = s.trim();
        !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("null")
    })
}

/// Parses query filters into the service filter set.
///
/// The `active_on` date is parsed leniently: an unreadable value imposes no
/// restriction. The kind filter, by contrast, is validated — silently
/// ignoring it would return the wrong slice of the directory.
fn parse_filter(params: &ListingQueryParams) -> Result<ListingFilter, DirectoryError> {
    let kind = match &params.kind {
        Some(raw) => Some(
            ListingKind::parse(raw)
                .ok_or_else(|| DirectoryError::InvalidListingKind(raw.clone()))?,
        ),
        None => None,
    };

    Ok(ListingFilter {
        q: params.q.clone().filter(|s| !s.trim().is_empty()),
        kind,
        city: params.city.clone().filter(|s| !s.trim().is_empty()),
        active_on: params.active_on.as_deref().and_then(parse_date_lenient),
    })
}
