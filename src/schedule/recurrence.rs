//! Structured recurrence model and the legacy pattern-string parser.
//!
//! Listings store their recurrence as a short human-authored string
//! (`"Weekly on Sunday, Wednesday"`, `"Monthly on the 3rd Saturday"`,
//! `"Daily"`). The admin authoring UI builds these strings from a weekday
//! multi-select and an ordinal dropdown, so the grammar is a wire format
//! that must be parsed exactly as written. [`Recurrence::parse`] converts
//! the string into a tagged value once at the data boundary; all matching
//! logic operates on the structured form and never re-reads the string.
//!
//! Parsing is fail-open: text that carries no recognizable restriction
//! yields [`Recurrence::Unrestricted`] (matches every day) rather than an
//! error. A listing must never disappear from the directory because of a
//! data-entry glitch.

use chrono::Weekday;

/// Full English day names paired with their [`Weekday`], in the
/// Sunday-first order the product displays.
const DAY_NAMES: [(&str, Weekday); 7] = [
    ("sunday", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
];

/// Set of weekdays packed into a single byte (bit `n` = `n` days from
/// Monday, chrono's numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Adds a weekday to the set.
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    /// Returns `true` if the set contains the given weekday.
    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Returns `true` if no weekday is in the set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of weekdays in the set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates the set in Sunday-first display order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        DAY_NAMES
            .into_iter()
            .map(|(_, day)| day)
            .filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// Which week of the month a monthly recurrence targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthWeek {
    /// The nth occurrence of the weekday (1-based week-of-month).
    Nth(u8),
    /// The final occurrence of the weekday in the month.
    Last,
}

/// Structured recurrence descriptor.
///
/// Constructed from the legacy pattern string by [`Recurrence::parse`].
/// `Unrestricted` and `Never` are degraded forms that cannot be authored
/// directly but arise from imperfect legacy data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    /// Occurs every day.
    Daily,
    /// Occurs on a fixed set of weekdays every week.
    Weekly {
        /// Weekdays the listing operates on.
        days: WeekdaySet,
    },
    /// Occurs on one week-of-month slot (e.g. the 3rd Saturday).
    Monthly {
        /// Targeted week of the month.
        week: MonthWeek,
        /// Weekdays that qualify within that week.
        days: WeekdaySet,
    },
    /// Pattern text present but carrying no recognizable restriction;
    /// matches every day (fail-open).
    Unrestricted,
    /// Monthly pattern naming no weekday; can never match a date.
    Never,
}

impl Recurrence {
    /// Parses a legacy pattern string into a structured recurrence.
    ///
    /// Returns `None` when the pattern is absent: empty after trimming, or
    /// the literal string `"null"` (a serialization artifact in legacy
    /// rows). All other inputs produce `Some`; unrecognizable text maps to
    /// [`Recurrence::Unrestricted`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim().to_lowercase();
        if text.is_empty() || text == "null" {
            return None;
        }

        if text.contains("daily") || text.contains("every day") {
            return Some(Self::Daily);
        }

        if text.contains("monthly") {
            let days = extract_days(&text);
            if days.is_empty() {
                return Some(Self::Never);
            }
            if let Some(n) = find_ordinal(&text) {
                return Some(Self::Monthly {
                    week: MonthWeek::Nth(n),
                    days,
                });
            }
            if text.contains("last") {
                return Some(Self::Monthly {
                    week: MonthWeek::Last,
                    days,
                });
            }
            // Monthly without an ordinal: degrade to a weekday-only match.
            return Some(Self::Weekly { days });
        }

        let days = extract_days(&text);
        if days.is_empty() {
            return Some(Self::Unrestricted);
        }
        Some(Self::Weekly { days })
    }

    /// Renders the canonical pattern string the admin UI would author for
    /// this recurrence, or `None` for the degraded forms that have no
    /// authorable representation.
    #[must_use]
    pub fn to_pattern(&self) -> Option<String> {
        match self {
            Self::Daily => Some("Daily".to_string()),
            Self::Weekly { days } => {
                let names: Vec<&str> = days.iter().map(day_name).collect();
                Some(format!("Weekly on {}", names.join(", ")))
            }
            Self::Monthly { week, days } => {
                let names: Vec<&str> = days.iter().map(day_name).collect();
                let slot = match week {
                    MonthWeek::Nth(n) => ordinal_label(*n),
                    MonthWeek::Last => "Last".to_string(),
                };
                Some(format!("Monthly on the {} {}", slot, names.join(", ")))
            }
            Self::Unrestricted | Self::Never => None,
        }
    }
}

/// Extracts every full English day name mentioned in the lowercased text.
fn extract_days(text: &str) -> WeekdaySet {
    DAY_NAMES
        .into_iter()
        .filter(|(name, _)| text.contains(name))
        .map(|(_, day)| day)
        .collect()
}

/// Finds the first digit immediately followed by an English ordinal suffix
/// (`st`, `nd`, `rd`, `th`) and returns its value.
fn find_ordinal(text: &str) -> Option<u8> {
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if !b.is_ascii_digit() {
            continue;
        }
        let suffix = bytes.get(i + 1..i + 3)?;
        if matches!(
            suffix,
            [b's', b't'] | [b'n', b'd'] | [b'r', b'd'] | [b't', b'h']
        ) {
            return Some(*b - b'0');
        }
    }
    None
}

/// Full display name for a weekday.
fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// English ordinal label for a week number (`1` → `"1st"`).
fn ordinal_label(n: u8) -> String {
    let suffix = match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
