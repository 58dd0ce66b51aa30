//! Listing service: orchestrates listing operations and emits events.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};

use crate::domain::listing::{Listing, ListingKind, ScheduleSegment};
use crate::domain::listing_event::ListingEvent;
use crate::domain::{EventBus, ListingId, ListingRegistry};
use crate::error::DirectoryError;

/// Field set for creating a listing.
///
/// Assembled by the API layer from the admin create form; identifiers and
/// timestamps are assigned by the service.
#[derive(Debug, Clone)]
pub struct ListingDraft {
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
}

/// Partial update for a listing.
///
/// `None` leaves a field unchanged. For the clearable fields the outer
/// `Option` is presence and the inner is the new value, so `Some(None)`
/// clears.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    /// New kind.
    pub kind: Option<ListingKind>,
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New street address.
    pub address: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New region code.
    pub region: Option<String>,
    /// New season start; `Some(None)` clears it.
    pub season_start_date: Option<Option<NaiveDate>>,
    /// New season end; `Some(None)` clears it.
    pub season_end_date: Option<Option<NaiveDate>>,
    /// New legacy start date; `Some(None)` clears it.
    pub start_date: Option<Option<NaiveDate>>,
    /// New legacy end date; `Some(None)` clears it.
    pub end_date: Option<Option<NaiveDate>>,
    /// New recurrence flag.
    pub is_recurring: Option<bool>,
    /// New pattern string; `Some(None)` clears it.
    pub recurring_pattern: Option<Option<String>>,
    /// New TBA flag.
    pub is_schedule_tba: Option<bool>,
    /// Replacement exception-segment list.
    pub additional_schedules: Option<Vec<ScheduleSegment>>,
}

/// Filter set for listing queries.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Case-insensitive substring over name, description, and city.
    pub q: Option<String>,
    /// Restrict to one listing kind.
    pub kind: Option<ListingKind>,
    /// Restrict to one city (case-insensitive exact match).
    pub city: Option<String>,
    /// Restrict to listings active on this date.
    pub active_on: Option<NaiveDate>,
}

impl ListingFilter {
    /// Returns `true` if the listing passes every set filter.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(kind) = self.kind
            && listing.kind != kind
        {
            return false;
        }
        if let Some(city) = &self.city
            && !listing.city.eq_ignore_ascii_case(city)
        {
            return false;
        }
        if let Some(q) = &self.q {
            let needle = q.to_lowercase();
            let hit = listing.name.to_lowercase().contains(&needle)
                || listing.description.to_lowercase().contains(&needle)
                || listing.city.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(date) = self.active_on
            && !listing.is_active_on(date)
        {
            return false;
        }
        true
    }
}

/// Orchestration layer for all listing operations.
///
/// Stateless coordinator: owns references to [`ListingRegistry`] for state
/// and [`EventBus`] for event emission. Every mutation method follows the
/// pattern: acquire lock → normalize → update → emit events → return
/// result.
#[derive(Debug, Clone)]
pub struct ListingService {
    registry: Arc<ListingRegistry>,
    event_bus: EventBus,
}

impl ListingService {
    /// Creates a new `ListingService`.
    #[must_use]
    pub fn new(registry: Arc<ListingRegistry>, event_bus: EventBus) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`ListingRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ListingRegistry> {
        &self.registry
    }

    /// Creates a new listing from the given draft.
    ///
    /// A TBA draft has its date fields cleared before insertion: a listing
    /// with an unannounced schedule carries no dates.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidRequest`] if the name is empty.
    pub async fn create_listing(&self, draft: ListingDraft) -> Result<Listing, DirectoryError> {
        if draft.name.trim().is_empty() {
            return Err(DirectoryError::InvalidRequest(
                "listing name must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let mut listing = Listing {
            listing_id: ListingId::new(),
            kind: draft.kind,
            name: draft.name,
            description: draft.description,
            address: draft.address,
            city: draft.city,
            region: draft.region,
            season_start_date: draft.season_start_date,
            season_end_date: draft.season_end_date,
            start_date: draft.start_date,
            end_date: draft.end_date,
            is_recurring: draft.is_recurring,
            recurring_pattern: draft.recurring_pattern,
            is_schedule_tba: draft.is_schedule_tba,
            additional_schedules: draft.additional_schedules,
            created_at: now,
            updated_at: now,
        };
        if listing.is_schedule_tba {
            listing.clear_schedule_dates();
        }

        let listing_id = self.registry.insert(listing.clone()).await?;

        let _ = self.event_bus.publish(ListingEvent::ListingCreated {
            listing_id,
            kind: listing.kind,
            name: listing.name.clone(),
            city: listing.city.clone(),
            timestamp: now,
        });

        tracing::info!(%listing_id, kind = listing.kind.as_str(), "listing created");
        Ok(listing)
    }

    /// Applies a partial update to a listing.
    ///
    /// Emits `ListingUpdated`, and additionally `ScheduleAnnounced` when
    /// the update takes a previously-TBA listing to a concrete schedule.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::ListingNotFound`] if the listing does not
    /// exist, or [`DirectoryError::InvalidRequest`] if the patch empties
    /// the name.
    pub async fn update_listing(
        &self,
        listing_id: ListingId,
        patch: ListingPatch,
    ) -> Result<Listing, DirectoryError> {
        if let Some(name) = &patch.name
            && name.trim().is_empty()
        {
            return Err(DirectoryError::InvalidRequest(
                "listing name must not be empty".to_string(),
            ));
        }

        let entry_lock = self.registry.get(listing_id).await?;
        let mut listing = entry_lock.write().await;
        let was_tba = listing.is_schedule_tba;

        if let Some(kind) = patch.kind {
            listing.kind = kind;
        }
        if let Some(name) = patch.name {
            listing.name = name;
        }
        if let Some(description) = patch.description {
            listing.description = description;
        }
        if let Some(address) = patch.address {
            listing.address = address;
        }
        if let Some(city) = patch.city {
            listing.city = city;
        }
        if let Some(region) = patch.region {
            listing.region = region;
        }
        if let Some(value) = patch.season_start_date {
            listing.season_start_date = value;
        }
        if let Some(value) = patch.season_end_date {
            listing.season_end_date = value;
        }
        if let Some(value) = patch.start_date {
            listing.start_date = value;
        }
        if let Some(value) = patch.end_date {
            listing.end_date = value;
        }
        if let Some(flag) = patch.is_recurring {
            listing.is_recurring = Some(flag);
        }
        if let Some(value) = patch.recurring_pattern {
            listing.recurring_pattern = value;
        }
        if let Some(tba) = patch.is_schedule_tba {
            listing.is_schedule_tba = tba;
        }
        if let Some(segments) = patch.additional_schedules {
            listing.additional_schedules = segments;
        }

        if listing.is_schedule_tba {
            listing.clear_schedule_dates();
        }
        listing.updated_at = Utc::now();

        let announced = was_tba && !listing.is_schedule_tba && listing.has_schedule();
        let updated = listing.clone();
        drop(listing);

        let _ = self.event_bus.publish(ListingEvent::ListingUpdated {
            listing_id,
            name: updated.name.clone(),
            timestamp: updated.updated_at,
        });

        if announced {
            let _ = self.event_bus.publish(ListingEvent::ScheduleAnnounced {
                listing_id,
                recurring_pattern: updated.recurring_pattern.clone(),
                season_start_date: updated.season_start_date,
                season_end_date: updated.season_end_date,
                timestamp: updated.updated_at,
            });
            tracing::info!(%listing_id, "schedule announced");
        }

        Ok(updated)
    }

    /// Removes a listing from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::ListingNotFound`] if the listing does not
    /// exist.
    pub async fn remove_listing(&self, listing_id: ListingId) -> Result<(), DirectoryError> {
        let _listing = self.registry.remove(listing_id).await?;

        let _ = self.event_bus.publish(ListingEvent::ListingRemoved {
            listing_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%listing_id, "listing removed");
        Ok(())
    }

    /// Returns a snapshot of a single listing.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::ListingNotFound`] if the listing does not
    /// exist.
    pub async fn get_listing(&self, listing_id: ListingId) -> Result<Listing, DirectoryError> {
        let entry_lock = self.registry.get(listing_id).await?;
        let listing = entry_lock.read().await;
        Ok(listing.clone())
    }

    /// Returns every listing passing the filter, sorted by name for stable
    /// pagination.
    pub async fn search(&self, filter: &ListingFilter) -> Vec<Listing> {
        let mut listings: Vec<Listing> = self
            .registry
            .list()
            .await
            .into_iter()
            .filter(|l| filter.matches(l))
            .collect();
        listings.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.listing_id.as_uuid().cmp(b.listing_id.as_uuid()))
        });
        listings
    }

    /// Returns the next active date for a listing on or after `from`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::ListingNotFound`] if the listing does not
    /// exist.
    pub async fn next_occurrence(
        &self,
        listing_id: ListingId,
        from: NaiveDate,
    ) -> Result<Option<NaiveDate>, DirectoryError> {
        let entry_lock = self.registry.get(listing_id).await?;
        let listing = entry_lock.read().await;
        Ok(listing.next_occurrence_on_or_after(from))
    }

    /// Counts active listings for every day of the given month.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidRequest`] when the month is out of
    /// range or the year is outside the calendar widget's span.
    pub async fn calendar_counts(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<(NaiveDate, usize)>, DirectoryError> {
        if !(1..=12).contains(&month) {
            return Err(DirectoryError::InvalidRequest(format!(
                "month out of range: {month}"
            )));
        }
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Err(DirectoryError::InvalidRequest(format!(
                "invalid calendar month: {year}-{month:02}"
            )));
        };

        let listings = self.registry.list().await;
        let mut counts = Vec::with_capacity(31);
        let mut day = first;
        while day.month() == month {
            let active = listings.iter().filter(|l| l.is_active_on(day)).count();
            counts.push((day, active));
            let Some(next) = day.succ_opt() else {
                break;
            };
            day = next;
        }
        Ok(counts)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            panic!("invalid test date {y}-{m}-{d}");
        };
        date
    }

    fn make_service() -> ListingService {
        let registry = Arc::new(ListingRegistry::new());
        let event_bus = EventBus::new(1000);
        ListingService::new(registry, event_bus)
    }

    fn make_draft(name: &str) -> ListingDraft {
        ListingDraft {
            kind: ListingKind::Market,
            name: name.to_string(),
            description: "Outdoor antique market".to_string(),
            address: "411 E Court St".to_string(),
            city: "Elkhorn".to_string(),
            region: "WI".to_string(),
            season_start_date: Some(date(2026, 5, 1)),
            season_end_date: Some(date(2026, 9, 30)),
            start_date: None,
            end_date: None,
            is_recurring: Some(true),
            recurring_pattern: Some("Weekly on Sunday".to_string()),
            is_schedule_tba: false,
            additional_schedules: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_listing_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let result = service.create_listing(make_draft("Sunday Flea")).await;
        assert!(result.is_ok());

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "listing_created");
    }

    #[tokio::test]
    async fn create_rejects_empty_name() {
        let service = make_service();
        let result = service.create_listing(make_draft("   ")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn tba_creation_clears_dates() {
        let service = make_service();
        let mut draft = make_draft("Mystery Market");
        draft.is_schedule_tba = true;

        let Ok(listing) = service.create_listing(draft).await else {
            panic!("creation failed");
        };
        assert_eq!(listing.season_start_date, None);
        assert_eq!(listing.season_end_date, None);
        assert!(!listing.is_active_on(date(2026, 6, 7)));
    }

    #[tokio::test]
    async fn update_applies_patch_and_emits() {
        let service = make_service();
        let Ok(listing) = service.create_listing(make_draft("Sunday Flea")).await else {
            panic!("creation failed");
        };
        let mut rx = service.event_bus().subscribe();

        let patch = ListingPatch {
            name: Some("Sunday Flea & Vintage".to_string()),
            ..ListingPatch::default()
        };
        let updated = service.update_listing(listing.listing_id, patch).await;
        let Ok(updated) = updated else {
            panic!("update failed");
        };
        assert_eq!(updated.name, "Sunday Flea & Vintage");

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "listing_updated");
    }

    #[tokio::test]
    async fn announcing_a_tba_schedule_emits_extra_event() {
        let service = make_service();
        let mut draft = make_draft("Mystery Market");
        draft.is_schedule_tba = true;
        let Ok(listing) = service.create_listing(draft).await else {
            panic!("creation failed");
        };
        let mut rx = service.event_bus().subscribe();

        let patch = ListingPatch {
            is_schedule_tba: Some(false),
            season_start_date: Some(Some(date(2026, 6, 1))),
            season_end_date: Some(Some(date(2026, 8, 31))),
            recurring_pattern: Some(Some("Weekly on Saturday".to_string())),
            ..ListingPatch::default()
        };
        let Ok(updated) = service.update_listing(listing.listing_id, patch).await else {
            panic!("update failed");
        };
        assert!(!updated.is_schedule_tba);

        let first = rx.recv().await;
        let Ok(first) = first else {
            panic!("expected updated event");
        };
        assert_eq!(first.event_type_str(), "listing_updated");
        let second = rx.recv().await;
        let Ok(second) = second else {
            panic!("expected announced event");
        };
        assert_eq!(second.event_type_str(), "schedule_announced");
    }

    #[tokio::test]
    async fn setting_tba_clears_dates_on_update() {
        let service = make_service();
        let Ok(listing) = service.create_listing(make_draft("Sunday Flea")).await else {
            panic!("creation failed");
        };

        let patch = ListingPatch {
            is_schedule_tba: Some(true),
            ..ListingPatch::default()
        };
        let Ok(updated) = service.update_listing(listing.listing_id, patch).await else {
            panic!("update failed");
        };
        assert!(updated.is_schedule_tba);
        assert_eq!(updated.season_start_date, None);
        assert_eq!(updated.season_end_date, None);
    }

    #[tokio::test]
    async fn remove_listing_emits_event() {
        let service = make_service();
        let Ok(listing) = service.create_listing(make_draft("Sunday Flea")).await else {
            panic!("creation failed");
        };
        let mut rx = service.event_bus().subscribe();

        let result = service.remove_listing(listing.listing_id).await;
        assert!(result.is_ok());

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "listing_removed");
    }

    #[tokio::test]
    async fn search_filters_compose() {
        let service = make_service();
        let _ = service.create_listing(make_draft("Sunday Flea")).await;
        let mut shop = make_draft("Second Story Consignment");
        shop.kind = ListingKind::Consignment;
        shop.city = "Madison".to_string();
        shop.recurring_pattern = Some("Daily".to_string());
        let _ = service.create_listing(shop).await;

        let all = service.search(&ListingFilter::default()).await;
        assert_eq!(all.len(), 2);

        let markets = service
            .search(&ListingFilter {
                kind: Some(ListingKind::Market),
                ..ListingFilter::default()
            })
            .await;
        assert_eq!(markets.len(), 1);

        let madison = service
            .search(&ListingFilter {
                city: Some("madison".to_string()),
                ..ListingFilter::default()
            })
            .await;
        assert_eq!(madison.len(), 1);

        // 2026-05-04 is a Monday: the weekly-Sunday market is inactive, the
        // daily consignment shop is active.
        let monday = service
            .search(&ListingFilter {
                active_on: Some(date(2026, 5, 4)),
                ..ListingFilter::default()
            })
            .await;
        assert_eq!(monday.len(), 1);
        let Some(hit) = monday.first() else {
            panic!("no hit");
        };
        assert_eq!(hit.kind, ListingKind::Consignment);
    }

    #[tokio::test]
    async fn search_text_query_matches_description() {
        let service = make_service();
        let _ = service.create_listing(make_draft("Sunday Flea")).await;

        let hits = service
            .search(&ListingFilter {
                q: Some("antique".to_string()),
                ..ListingFilter::default()
            })
            .await;
        assert_eq!(hits.len(), 1);

        let misses = service
            .search(&ListingFilter {
                q: Some("nautical".to_string()),
                ..ListingFilter::default()
            })
            .await;
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn next_occurrence_for_listing() {
        let service = make_service();
        let Ok(listing) = service.create_listing(make_draft("Sunday Flea")).await else {
            panic!("creation failed");
        };

        // First in-season Sunday on or after May 1 2026 is May 3.
        let next = service
            .next_occurrence(listing.listing_id, date(2026, 5, 1))
            .await;
        assert_eq!(next.ok().flatten(), Some(date(2026, 5, 3)));
    }

    #[tokio::test]
    async fn calendar_counts_match_predicate() {
        let service = make_service();
        let Ok(listing) = service.create_listing(make_draft("Sunday Flea")).await else {
            panic!("creation failed");
        };

        let Ok(counts) = service.calendar_counts(2026, 5).await else {
            panic!("calendar failed");
        };
        assert_eq!(counts.len(), 31);
        for (day, count) in counts {
            let expected = usize::from(listing.is_active_on(day));
            assert_eq!(count, expected, "mismatch on {day}");
            assert_eq!(day.month(), 5);
        }
    }

    #[tokio::test]
    async fn calendar_rejects_bad_month() {
        let service = make_service();
        assert!(service.calendar_counts(2026, 0).await.is_err());
        assert!(service.calendar_counts(2026, 13).await.is_err());
    }
}
