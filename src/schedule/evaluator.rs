//! Active-date predicate and next-occurrence search over a listing's
//! schedule fields.
//!
//! [`Schedule`] is assembled once from a listing (season window, parsed
//! recurrence, flags) and answers the two questions every surface asks:
//! "is this listing active on date D?" and "what is the next active date on
//! or after D?". The calendar grid, the list view, and the detail view all
//! call through here so their answers cannot drift apart.
//!
//! Like the parser, evaluation is fail-open: missing or malformed schedule
//! data relaxes constraints instead of hiding the listing. The single hard
//! exclusion is a TBA schedule, which matches nothing.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::recurrence::{MonthWeek, Recurrence, WeekdaySet};

/// How many calendar months ahead the monthly next-occurrence search scans
/// before giving up.
const MONTHLY_LOOKAHEAD_MONTHS: u32 = 12;

/// Evaluable schedule for a single listing.
///
/// Season bounds are inclusive on both ends; an absent bound imposes no
/// constraint on that side. `recurrence` is `None` when the listing has no
/// pattern string at all, in which case `explicitly_non_recurring` decides
/// between single-day and continuous-range semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Schedule not yet announced; excluded from all date matching.
    pub tba: bool,
    /// First day the schedule applies (inclusive).
    pub season_start: Option<NaiveDate>,
    /// Last day the schedule applies (inclusive).
    pub season_end: Option<NaiveDate>,
    /// Parsed recurrence, or `None` when no pattern is stored.
    pub recurrence: Option<Recurrence>,
    /// `true` only when the listing's `is_recurring` flag is stored as an
    /// explicit `false` (as opposed to absent).
    pub explicitly_non_recurring: bool,
}

impl Schedule {
    /// Builds a schedule from raw listing fields.
    ///
    /// `raw_pattern` is the stored pattern string, parsed leniently;
    /// `is_recurring` is the stored tri-state flag.
    #[must_use]
    pub fn from_parts(
        tba: bool,
        season_start: Option<NaiveDate>,
        season_end: Option<NaiveDate>,
        raw_pattern: Option<&str>,
        is_recurring: Option<bool>,
    ) -> Self {
        Self {
            tba,
            season_start,
            season_end,
            recurrence: raw_pattern.and_then(Recurrence::parse),
            explicitly_non_recurring: is_recurring == Some(false),
        }
    }

    /// Returns `true` if the listing is active on the given date.
    ///
    /// Time-of-day is out of scope; dates compare at day granularity.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if self.tba {
            return false;
        }
        if let Some(start) = self.season_start
            && date < start
        {
            return false;
        }
        if let Some(end) = self.season_end
            && date > end
        {
            return false;
        }

        match &self.recurrence {
            None => {
                if self.explicitly_non_recurring {
                    match (self.season_start, self.season_end) {
                        // Both bounds: continuously active across the range.
                        (Some(_), Some(_)) => true,
                        // Start only: a single fixed-date event.
                        (Some(start), None) => date == start,
                        _ => true,
                    }
                } else {
                    true
                }
            }
            Some(Recurrence::Daily | Recurrence::Unrestricted) => true,
            Some(Recurrence::Never) => false,
            Some(Recurrence::Weekly { days }) => days.contains(date.weekday()),
            Some(Recurrence::Monthly { week, days }) => matches_monthly(*week, *days, date),
        }
    }

    /// Returns the first date on or after `anchor` on which the listing is
    /// active, or `None` when no such date exists within the search bounds.
    ///
    /// A non-`None` result always satisfies [`Schedule::is_active_on`], and
    /// no date strictly between `anchor` and the result does.
    #[must_use]
    pub fn next_occurrence_on_or_after(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        if self.tba {
            return None;
        }
        let start = self.season_start?;
        let search_start = anchor.max(start);
        if let Some(end) = self.season_end
            && search_start > end
        {
            return None;
        }

        match &self.recurrence {
            None => {
                if self.explicitly_non_recurring && self.season_end.is_none() {
                    // Single fixed-date event: only its own date qualifies.
                    if start >= anchor { Some(start) } else { None }
                } else {
                    // Ongoing range: happening now (or at season open).
                    Some(search_start)
                }
            }
            Some(Recurrence::Daily | Recurrence::Unrestricted) => Some(search_start),
            Some(Recurrence::Never) => None,
            Some(Recurrence::Weekly { days }) => self.next_weekly(search_start, *days),
            Some(Recurrence::Monthly { week, days }) => {
                self.next_monthly(search_start, *week, *days)
            }
        }
    }

    /// Scans the 7-day window starting at `search_start`. A weekly pattern
    /// with a non-empty day set always hits within any 7 consecutive days,
    /// so the bounded window only comes up empty when the day set is empty
    /// or the season ends mid-week.
    fn next_weekly(&self, search_start: NaiveDate, days: WeekdaySet) -> Option<NaiveDate> {
        (0..7u64)
            .filter_map(|offset| search_start.checked_add_days(Days::new(offset)))
            .find(|d| days.contains(d.weekday()))
            .filter(|d| self.season_end.is_none_or(|end| *d <= end))
    }

    /// Scans forward month by month for the first week-of-month slot on or
    /// after `search_start`, bounded by [`MONTHLY_LOOKAHEAD_MONTHS`].
    fn next_monthly(
        &self,
        search_start: NaiveDate,
        week: MonthWeek,
        days: WeekdaySet,
    ) -> Option<NaiveDate> {
        let mut year = search_start.year();
        let mut month = search_start.month();
        for _ in 0..MONTHLY_LOOKAHEAD_MONTHS {
            let candidate = days
                .iter()
                .filter_map(|day| monthly_slot_in(year, month, week, day))
                .filter(|d| *d >= search_start)
                .min();
            if let Some(found) = candidate {
                if let Some(end) = self.season_end
                    && found > end
                {
                    return None;
                }
                return Some(found);
            }
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }
        None
    }
}

/// Monthly match: the weekday must be in the set, and the date must land in
/// the targeted week-of-month slot.
fn matches_monthly(week: MonthWeek, days: WeekdaySet, date: NaiveDate) -> bool {
    if !days.contains(date.weekday()) {
        return false;
    }
    match week {
        MonthWeek::Nth(n) => week_of_month(date) == u32::from(n),
        // Final occurrence: one more week would cross into the next month.
        MonthWeek::Last => date.day() + 7 > days_in_month(date.year(), date.month()),
    }
}

/// 1-based week-of-month (`1st..=5th`) of a date.
fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// Number of days in the given month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

/// Date of the requested week-of-month slot for one weekday, or `None` when
/// the slot does not exist (e.g. a 5th Saturday in a four-Saturday month).
fn monthly_slot_in(year: i32, month: u32, week: MonthWeek, day: Weekday) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let to_first_hit =
        (day.num_days_from_monday() + 7 - first.weekday().num_days_from_monday()) % 7;
    match week {
        MonthWeek::Nth(n) => {
            let n = u32::from(n).checked_sub(1)?;
            let day_of_month = 1 + to_first_hit + n * 7;
            if day_of_month > days_in_month(year, month) {
                return None;
            }
            NaiveDate::from_ymd_opt(year, month, day_of_month)
        }
        MonthWeek::Last => {
            let mut day_of_month = 1 + to_first_hit;
            while day_of_month + 7 <= days_in_month(year, month) {
                day_of_month += 7;
            }
            NaiveDate::from_ymd_opt(year, month, day_of_month)
        }
    }
}

/// Parses a stored date string leniently.
///
/// Accepts `YYYY-MM-DD`, or any string whose first ten characters form one
/// (covering timestamp-suffixed legacy rows). Anything else — including the
/// literal `"null"` — yields `None`, which callers treat as "no constraint"
/// rather than an error.
#[must_use]
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().or_else(|| {
        trimmed
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    })
}
