//! Calendar conversion between collection day indices and real dates.
//!
//! The collection numbers days from a fixed day zero, with the day boundary
//! at a configurable rollover hour rather than midnight. The `Timeline` is
//! the single place that mapping lives; the placement loop asks it for the
//! weekday of a day index when deciding whether the day is blocked.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::domain::DayIndex;

/// Maps day indices to calendar dates and weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    /// Calendar date of day index 0.
    day_zero: NaiveDate,

    /// Hour of day (0-23) at which the collection day rolls over.
    rollover_hour: u8,
}

impl Timeline {
    /// Create a timeline anchored at the given day zero and rollover hour.
    pub fn new(day_zero: NaiveDate, rollover_hour: u8) -> Self {
        Self {
            day_zero,
            rollover_hour: rollover_hour % 24,
        }
    }

    /// Calendar date of a day index.
    pub fn date_of(&self, day: DayIndex) -> NaiveDate {
        self.day_zero + Duration::days(day)
    }

    /// Weekday of a day index.
    pub fn weekday_of(&self, day: DayIndex) -> Weekday {
        self.date_of(day).weekday()
    }

    /// Day index containing the given local timestamp.
    ///
    /// Times before the rollover hour still belong to the previous
    /// collection day.
    pub fn today_at(&self, now: NaiveDateTime) -> DayIndex {
        let date = if now.hour() < u32::from(self.rollover_hour) {
            now.date() - Duration::days(1)
        } else {
            now.date()
        };
        (date - self.day_zero).num_days()
    }
}

/// A set of weekdays, stored as a bitmask.
///
/// Used for the "easy days" a flatten run must leave untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdaySet {
    bits: u8,
}

impl WeekdaySet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a weekday to the set.
    pub fn insert(&mut self, day: Weekday) {
        self.bits |= 1 << day.num_days_from_monday();
    }

    /// Whether the set contains a weekday.
    pub fn contains(&self, day: Weekday) -> bool {
        self.bits & (1 << day.num_days_from_monday()) != 0
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of weekdays in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
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

/// Parse a weekday from a config name ("mon", "monday", case-insensitive).
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
