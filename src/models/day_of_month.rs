//! Day-of-month grid positions.
//!
//! A [`DayOfMonth`] names an abstract recurring position such as
//! "second Tuesday" without binding it to any concrete month. The whole
//! roster grid is built from these positions: an assignment lives on one,
//! and resolving a calendar date means asking which position the date
//! occupies.
//!
//! Both conversion directions are total in one way only. Every date maps
//! to exactly one position, but a position maps into a given month only
//! when that month is long enough (most months have no fifth Monday), so
//! [`DayOfMonth::to_date`] returns an `Option`.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use u_roster::models::DayOfMonth;
//!
//! let first_friday = DayOfMonth::new(5, 1).unwrap();
//! assert_eq!(
//!     first_friday.to_date(2019, 11),
//!     NaiveDate::from_ymd_opt(2019, 11, 1),
//! );
//!
//! let date = NaiveDate::from_ymd_opt(2019, 11, 29).unwrap();
//! assert_eq!(DayOfMonth::from_date(date).to_string(), "Fifth Friday");
//! ```

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::recurrence::RecurrenceError;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WEEK_NAMES: [&str; 5] = ["First", "Second", "Third", "Fourth", "Fifth"];

/// A recurring position in the month grid: weekday plus week ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayOfMonth {
    /// ISO weekday number, 1 = Monday through 7 = Sunday.
    pub day_of_week: u8,
    /// Week ordinal within the month, 1 through 5.
    pub week_of_month: u8,
}

impl DayOfMonth {
    /// Creates a position from raw field values, rejecting out-of-range input.
    pub fn new(day_of_week: u8, week_of_month: u8) -> Result<Self, RecurrenceError> {
        if !(1..=7).contains(&day_of_week) {
            return Err(RecurrenceError::WeekdayOutOfRange(i64::from(day_of_week)));
        }
        if !(1..=5).contains(&week_of_month) {
            return Err(RecurrenceError::OrdinalOutOfRange(i64::from(week_of_month)));
        }
        Ok(Self {
            day_of_week,
            week_of_month,
        })
    }

    /// Creates the `week_of_month`-th occurrence of `weekday`.
    ///
    /// The ordinal is taken as given; callers expanding rule text are
    /// expected to have range-checked it already.
    pub fn nth(week_of_month: u8, weekday: Weekday) -> Self {
        Self {
            day_of_week: weekday.number_from_monday() as u8,
            week_of_month,
        }
    }

    /// The grid position a concrete date occupies.
    ///
    /// The week ordinal counts from the 1st of the month in strides of
    /// seven: days 1 through 7 are week 1, days 8 through 14 week 2, and
    /// so on. This is independent of which weekday the month starts on.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            day_of_week: date.weekday().number_from_monday() as u8,
            week_of_month: (date.day0() / 7 + 1) as u8,
        }
    }

    /// The concrete date this position lands on in the given month, or
    /// `None` when the month has no such occurrence.
    pub fn to_date(self, year: i32, month: u32) -> Option<NaiveDate> {
        NaiveDate::from_weekday_of_month_opt(year, month, self.weekday(), self.week_of_month)
    }

    /// The weekday of this position.
    pub fn weekday(self) -> Weekday {
        match self.day_of_week {
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    /// Human-readable weekday name, e.g. `"Tuesday"`.
    pub fn day_name(self) -> &'static str {
        DAY_NAMES[(self.day_of_week as usize - 1).min(6)]
    }

    /// Human-readable week ordinal, e.g. `"Second"`.
    pub fn week_name(self) -> &'static str {
        WEEK_NAMES[(self.week_of_month as usize - 1).min(4)]
    }
}

impl fmt::Display for DayOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.week_name(), self.day_name())
    }
}

/// Whether the date falls on a Saturday or Sunday.
///
/// The operation never runs on weekends; deliveries that would land
/// there are folded into the weekend-bonus meals carried on the last
/// weekday run instead.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// ============================================================
// Tests
// ============================================================
