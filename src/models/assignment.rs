//! Recurring assignments and date-specific substitutions.
//!
//! An assignment binds one grid position of a job to a volunteer, or to
//! nobody. An open slot is deliberate data, not an error: it marks a
//! position that needs a substitute every time it comes around.
//!
//! A substitution pins a single concrete date of one assignment.
//! Whoever it names (possibly nobody yet) stands in for the
//! assignment's volunteer on that date alone; the resolver suppresses
//! the assignment's own row for the date as soon as the substitution
//! exists, filled or not.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::day_of_month::DayOfMonth;

/// A volunteer's recurring hold on one grid position of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    /// Default volunteer; `None` is an open slot.
    pub volunteer: Option<String>,
    pub job: String,
    /// ISO weekday of the grid position. Unset together with
    /// `week_of_month` on assignments governed by the job's own
    /// recurrence.
    pub day_of_week: Option<u8>,
    /// Week ordinal of the grid position.
    pub week_of_month: Option<u8>,
}

impl Assignment {
    /// An open assignment on a grid position.
    pub fn grid(id: impl Into<String>, job: impl Into<String>, slot: DayOfMonth) -> Self {
        Self {
            id: id.into(),
            volunteer: None,
            job: job.into(),
            day_of_week: Some(slot.day_of_week),
            week_of_month: Some(slot.week_of_month),
        }
    }

    /// An assignment whose dates come from the job's own recurrence
    /// rather than the grid.
    pub fn ad_hoc(id: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            volunteer: None,
            job: job.into(),
            day_of_week: None,
            week_of_month: None,
        }
    }

    pub fn with_volunteer(mut self, volunteer: impl Into<String>) -> Self {
        self.volunteer = Some(volunteer.into());
        self
    }

    /// The grid position, when this assignment lives on the grid.
    pub fn slot(&self) -> Option<DayOfMonth> {
        match (self.day_of_week, self.week_of_month) {
            (Some(day_of_week), Some(week_of_month)) => Some(DayOfMonth {
                day_of_week,
                week_of_month,
            }),
            _ => None,
        }
    }

    /// Whether dates come from the job's own recurrence.
    pub fn is_ad_hoc(&self) -> bool {
        self.day_of_week.is_none() && self.week_of_month.is_none()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let holder = self.volunteer.as_deref().unwrap_or("open slot");
        match self.slot() {
            Some(slot) => write!(f, "{holder}, {} on the {slot}", self.job),
            None => write!(f, "{holder}, {} on its own schedule", self.job),
        }
    }
}

/// A one-date stand-in for an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub id: String,
    /// The stand-in; `None` while the request is unfilled.
    pub volunteer: Option<String>,
    pub assignment: String,
    pub date: NaiveDate,
}

impl Substitution {
    /// An unfilled substitution request for one date.
    pub fn request(id: impl Into<String>, assignment: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            volunteer: None,
            assignment: assignment.into(),
            date,
        }
    }

    pub fn with_volunteer(mut self, volunteer: impl Into<String>) -> Self {
        self.volunteer = Some(volunteer.into());
        self
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.volunteer.as_deref() {
            Some(volunteer) => write!(f, "{volunteer} covers {} on {}", self.assignment, self.date),
            None => write!(f, "substitute wanted for {} on {}", self.assignment, self.date),
        }
    }
}

// ============================================================
// Tests
// ============================================================
