//! Listing aggregate: a market or consignment shop with its scheduling
//! metadata.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ListingId;
use crate::schedule::Schedule;

/// Kind of sales opportunity a listing represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// A recurring or seasonal vintage market.
    Market,
    /// A consignment shop with ongoing hours.
    Consignment,
}

impl ListingKind {
    /// Parses a kind discriminator string (`"market"` / `"consignment"`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "market" => Some(Self::Market),
            "consignment" => Some(Self::Consignment),
            _ => None,
        }
    }

    /// Returns the discriminator string used on the wire and in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Consignment => "consignment",
        }
    }
}

/// A seasonal exception segment layered over the primary schedule.
///
/// Segments are authored in the admin UI to describe things like holiday
/// hours or a mid-season venue change. They are stored and displayed
/// verbatim; the active-date evaluator does not consume them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScheduleSegment {
    /// Display label (e.g. `"Holiday market"`).
    pub label: String,
    /// Segment start date (inclusive), if bounded.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Segment end date (inclusive), if bounded.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Opening time as authored (e.g. `"10:00"`).
    #[serde(default)]
    pub start_time: Option<String>,
    /// Closing time as authored.
    #[serde(default)]
    pub end_time: Option<String>,
    /// Explicit day names this segment applies to, as authored.
    #[serde(default)]
    pub days: Vec<String>,
}

/// A directory listing with address, description, and scheduling metadata.
///
/// Listings are created and edited through the admin back-office, held in
/// the [`super::ListingRegistry`], and read by every consumer surface. The
/// schedule evaluator reads a listing without mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing identifier (immutable after creation).
    pub listing_id: ListingId,

    /// Kind of sales opportunity.
    pub kind: ListingKind,

    /// Display name.
    pub name: String,

    /// Free-text description shown on the detail page.
    pub description: String,

    /// Street address.
    pub address: String,

    /// City, used for filtering.
    pub city: String,

    /// State or region code.
    pub region: String,

    /// First day of the season the schedule applies within (inclusive).
    pub season_start_date: Option<NaiveDate>,

    /// Last day of the season (inclusive).
    pub season_end_date: Option<NaiveDate>,

    /// Legacy start date, used as a fallback when the season field is
    /// absent.
    pub start_date: Option<NaiveDate>,

    /// Legacy end date fallback.
    pub end_date: Option<NaiveDate>,

    /// Tri-state recurrence flag from legacy rows; `Some(false)` marks an
    /// explicitly non-recurring event.
    pub is_recurring: Option<bool>,

    /// Human-authored recurrence pattern string (the admin-UI wire format).
    pub recurring_pattern: Option<String>,

    /// Schedule not yet announced; excluded from all date matching.
    pub is_schedule_tba: bool,

    /// Display-only seasonal exception segments.
    pub additional_schedules: Vec<ScheduleSegment>,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Resolves the effective season start, falling back to the legacy
    /// field when the season field is absent.
    #[must_use]
    pub fn effective_start(&self) -> Option<NaiveDate> {
        self.season_start_date.or(self.start_date)
    }

    /// Resolves the effective season end with the same fallback.
    #[must_use]
    pub fn effective_end(&self) -> Option<NaiveDate> {
        self.season_end_date.or(self.end_date)
    }

    /// Assembles the evaluable schedule for this listing.
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        Schedule::from_parts(
            self.is_schedule_tba,
            self.effective_start(),
            self.effective_end(),
            self.recurring_pattern.as_deref(),
            self.is_recurring,
        )
    }

    /// Returns `true` if the listing is active on the given date.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.schedule().is_active_on(date)
    }

    /// Returns the next active date on or after `anchor`, if any.
    #[must_use]
    pub fn next_occurrence_on_or_after(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        self.schedule().next_occurrence_on_or_after(anchor)
    }

    /// Clears every date field. A TBA listing carries no dates.
    pub fn clear_schedule_dates(&mut self) {
        self.season_start_date = None;
        self.season_end_date = None;
        self.start_date = None;
        self.end_date = None;
    }

    /// Returns `true` if the listing has any concrete schedule data:
    /// a pattern or at least one effective bound.
    #[must_use]
    pub fn has_schedule(&self) -> bool {
        self.recurring_pattern.is_some()
            || self.effective_start().is_some()
            || self.effective_end().is_some()
    }
}
