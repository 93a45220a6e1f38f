//! The actuals resolver: who is really doing what job on what day.
//!
//! Three sources answer for different stretches of time, and no single
//! one of them is the whole truth:
//!
//! - **Assignments** (`date >= today`): grid rows projected day by day
//!   onto each date's position, plus ad-hoc rows firing on their job's
//!   own recurrence.
//! - **Substitutions** (`date >= today`): date-pinned overrides. A
//!   substitution suppresses its assignment's own row for the date
//!   whether or not anyone has picked it up.
//! - **History** (`date < today`): frozen [`VolunteerRecord`] rows,
//!   taken verbatim. Live data may have changed since; the records have
//!   not, which is the point.
//!
//! [`ActualsQuery`] merges the three into one deduplicated sequence of
//! [`Actual`] rows with shared filtering and ordering. Resolution here
//! is the only sanctioned answer to "what happens on day X": reading
//! assignments directly skips substitutions and history, and reports
//! built that way will disagree with this module.
//!
//! # Algorithm
//!
//! 1. Walk each day of the live window `[max(start, today), end)`,
//!    taking grid assignments on the day's position that no
//!    substitution pins, plus ad-hoc assignments whose job recurrence
//!    fires that day.
//! 2. Take substitutions dated in the live window, projected through
//!    their parent assignment.
//! 3. Take history rows dated in `[start, today)` verbatim.
//! 4. Union by full-row equality, keeping first-seen order, then apply
//!    the requested ordering.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use u_roster::actuals::ActualsQuery;
//! use u_roster::context::EngineContext;
//! use u_roster::models::{Assignment, DayOfMonth, Job, Volunteer};
//! use u_roster::roster::Roster;
//!
//! let mut roster = Roster::new();
//! roster.insert_volunteer(Volunteer::new("v1", "Ava", "Price")).unwrap();
//! roster.insert_job(Job::route("j1", "Route 7", 7)).unwrap();
//! let slot = DayOfMonth::new(1, 1).unwrap();
//! roster
//!     .insert_assignment(Assignment::grid("a1", "j1", slot).with_volunteer("v1"))
//!     .unwrap();
//!
//! // 2020-03-02 is the first Monday of March.
//! let today = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
//! let rows = ActualsQuery::on(today)
//!     .run(&roster, &EngineContext::on(today))
//!     .unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].volunteer.as_deref(), Some("v1"));
//! ```
//!
//! [`VolunteerRecord`]: crate::models::VolunteerRecord

use std::collections::HashSet;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::context::EngineContext;
use crate::models::{Actual, Assignment, DayOfMonth};
use crate::roster::Roster;

/// A malformed resolver query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// An ordering key outside volunteer/job/date.
    #[error("unsupported order_by key {0:?}; use \"volunteer\", \"job\", or \"date\"")]
    UnknownOrderKey(String),
    /// A wider range than the configured limit allows.
    #[error("range of {days} days exceeds the {max}-day query limit")]
    RangeTooWide { days: i64, max: i64 },
}

/// Sort key for resolver output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// Chronological.
    Date,
    /// Volunteer last name then first name; rows with nobody last.
    Volunteer,
    /// Route number, then kind, then name; routes before non-routes.
    Job,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Date => "date",
            OrderBy::Volunteer => "volunteer",
            OrderBy::Job => "job",
        }
    }
}

impl FromStr for OrderBy {
    type Err = QueryError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "date" => Ok(OrderBy::Date),
            "volunteer" => Ok(OrderBy::Volunteer),
            "job" => Ok(OrderBy::Job),
            other => Err(QueryError::UnknownOrderKey(other.to_string())),
        }
    }
}

/// Equality filter over an optional reference field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    /// No filtering.
    #[default]
    Any,
    /// Only rows where the field is unset.
    Unset,
    /// Only rows naming this id.
    Is(String),
}

impl Filter {
    pub fn is(id: impl Into<String>) -> Self {
        Filter::Is(id.into())
    }

    fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Filter::Any => true,
            Filter::Unset => value.is_none(),
            Filter::Is(id) => value == Some(id.as_str()),
        }
    }
}

/// A resolver query: a date range plus filters and ordering.
///
/// The query itself is the restartable object. [`run`](Self::run)
/// re-executes against the live roster every time and hands back an
/// owned, materialized `Vec`; hold that when you need a stable
/// snapshot, re-run when you want writes reflected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActualsQuery {
    pub start: NaiveDate,
    /// Exclusive end; `None` means the single day at `start`.
    pub end: Option<NaiveDate>,
    /// Filter on who covers the row.
    pub volunteer: Filter,
    /// Filter on who ordinarily holds the assignment.
    pub original: Filter,
    pub job: Filter,
    /// Ordering keys, applied in sequence.
    pub order_by: Vec<OrderBy>,
    /// Drop uncovered rows from the live window. History keeps its
    /// gaps; they are fact.
    pub exclude_unfilled: bool,
}

impl ActualsQuery {
    /// Resolves the single day at `start`.
    pub fn on(start: NaiveDate) -> Self {
        Self {
            start,
            end: None,
            volunteer: Filter::Any,
            original: Filter::Any,
            job: Filter::Any,
            order_by: Vec::new(),
            exclude_unfilled: false,
        }
    }

    /// Resolves `[start, end)`.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            end: Some(end),
            ..Self::on(start)
        }
    }

    pub fn with_volunteer(mut self, id: impl Into<String>) -> Self {
        self.volunteer = Filter::is(id);
        self
    }

    pub fn with_volunteer_filter(mut self, filter: Filter) -> Self {
        self.volunteer = filter;
        self
    }

    pub fn with_original(mut self, id: impl Into<String>) -> Self {
        self.original = Filter::is(id);
        self
    }

    pub fn with_original_filter(mut self, filter: Filter) -> Self {
        self.original = filter;
        self
    }

    pub fn with_job(mut self, id: impl Into<String>) -> Self {
        self.job = Filter::is(id);
        self
    }

    pub fn with_job_filter(mut self, filter: Filter) -> Self {
        self.job = filter;
        self
    }

    /// Appends an ordering key.
    pub fn ordered_by(mut self, key: OrderBy) -> Self {
        self.order_by.push(key);
        self
    }

    /// Appends an ordering key given as text, failing loudly on
    /// anything unsupported.
    pub fn ordered_by_key(mut self, key: &str) -> Result<Self, QueryError> {
        self.order_by.push(key.parse()?);
        Ok(self)
    }

    /// Drops uncovered live rows from the output.
    pub fn exclude_unfilled(mut self) -> Self {
        self.exclude_unfilled = true;
        self
    }

    /// Whether a live assignment passes the filters. For live rows the
    /// holder and the original are the same person, so both filters
    /// look at the same field.
    fn admits_assignment(&self, assignment: &Assignment) -> bool {
        let volunteer = assignment.volunteer.as_deref();
        if self.exclude_unfilled && volunteer.is_none() {
            return false;
        }
        self.volunteer.admits(volunteer)
            && self.original.admits(volunteer)
            && self.job.admits(Some(assignment.job.as_str()))
    }

    /// Executes the query against the roster.
    pub fn run(&self, roster: &Roster, ctx: &EngineContext) -> Result<Vec<Actual>, QueryError> {
        let end = self
            .end
            .unwrap_or_else(|| self.start.succ_opt().unwrap_or(self.start));
        let days = (end - self.start).num_days();
        if days > ctx.config.max_range_days {
            return Err(QueryError::RangeTooWide {
                days,
                max: ctx.config.max_range_days,
            });
        }

        let today = ctx.today;
        let live_start = self.start.max(today);

        let mut seen: HashSet<Actual> = HashSet::new();
        let mut rows: Vec<Actual> = Vec::new();

        // Filters never change mid-walk, so the ad-hoc candidates are
        // fixed up front; only their firing varies by day.
        let ad_hoc: Vec<&Assignment> = roster
            .ad_hoc_assignments()
            .filter(|assignment| self.admits_assignment(assignment))
            .collect();

        let mut day = live_start;
        while day < end {
            let position = DayOfMonth::from_date(day);
            for assignment in roster.assignments_on_slot(position) {
                if !self.admits_assignment(assignment) {
                    continue;
                }
                // Any substitution pinning this date suppresses the
                // assignment's own row, even an unfilled request.
                if roster.substitution_on(&assignment.id, day) {
                    continue;
                }
                let actual = Actual::from_assignment(assignment, day);
                if seen.insert(actual.clone()) {
                    rows.push(actual);
                }
            }
            for assignment in &ad_hoc {
                let fires = roster
                    .find_job(&assignment.job)
                    .and_then(|job| job.recurrence.as_ref())
                    .map(|recurrence| recurrence.occurs_on(day, ctx.config.rule_epoch))
                    .unwrap_or(false);
                if fires {
                    let actual = Actual::from_assignment(assignment, day);
                    if seen.insert(actual.clone()) {
                        rows.push(actual);
                    }
                }
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        for substitution in roster.substitutions() {
            if substitution.date < live_start || substitution.date >= end {
                continue;
            }
            let parent = match roster.find_assignment(&substitution.assignment) {
                Some(parent) => parent,
                None => continue,
            };
            let volunteer = substitution.volunteer.as_deref();
            if self.exclude_unfilled && volunteer.is_none() {
                continue;
            }
            if !self.volunteer.admits(volunteer) {
                continue;
            }
            if !self.original.admits(parent.volunteer.as_deref()) {
                continue;
            }
            if !self.job.admits(Some(parent.job.as_str())) {
                continue;
            }
            let actual = Actual::from_substitution(substitution, parent);
            if seen.insert(actual.clone()) {
                rows.push(actual);
            }
        }

        // History spans from the requested start right up to today,
        // regardless of the requested end: frozen rows answer for the
        // whole past of the window's origin. Uncovered rows stay even
        // under exclude_unfilled.
        for record in roster.volunteer_records() {
            if record.date < self.start || record.date >= today {
                continue;
            }
            if !self.volunteer.admits(record.volunteer.as_deref()) {
                continue;
            }
            if !self.original.admits(record.original.as_deref()) {
                continue;
            }
            if !self.job.admits(record.job.as_deref()) {
                continue;
            }
            let actual = Actual::from_record(record);
            if seen.insert(actual.clone()) {
                rows.push(actual);
            }
        }

        if !self.order_by.is_empty() {
            let mut keyed: Vec<(Vec<KeyPart>, Actual)> = rows
                .into_iter()
                .map(|actual| (sort_key(&actual, &self.order_by, roster), actual))
                .collect();
            keyed.sort_by(|left, right| left.0.cmp(&right.0));
            rows = keyed.into_iter().map(|(_, actual)| actual).collect();
        }
        Ok(rows)
    }
}

// ============================================================
// Ordering keys
// ============================================================

/// `Option` with the reversed null ordering listings want: present
/// values in their own order, absent ones after all of them.
#[derive(Debug, PartialEq, Eq)]
struct NullsLast<T>(Option<T>);

impl<T: Ord> Ord for NullsLast<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (&self.0, &other.0) {
            (Some(left), Some(right)) => left.cmp(right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl<T: Ord> PartialOrd for NullsLast<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum KeyPart {
    Date(NaiveDate),
    Volunteer(NullsLast<(String, String)>),
    Job(NullsLast<(bool, i32, String, String)>),
}

fn sort_key(actual: &Actual, order_by: &[OrderBy], roster: &Roster) -> Vec<KeyPart> {
    order_by
        .iter()
        .map(|key| match key {
            OrderBy::Date => KeyPart::Date(actual.date),
            OrderBy::Volunteer => KeyPart::Volunteer(NullsLast(
                actual
                    .volunteer
                    .as_deref()
                    .and_then(|id| roster.find_volunteer(id))
                    .map(|volunteer| (volunteer.last_name.clone(), volunteer.first_name.clone())),
            )),
            OrderBy::Job => KeyPart::Job(NullsLast(
                actual
                    .job
                    .as_deref()
                    .and_then(|id| roster.find_job(id))
                    .map(|job| job.order_key()),
            )),
        })
        .collect()
}

// ============================================================
// Tests
// ============================================================
