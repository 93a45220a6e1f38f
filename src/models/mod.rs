//! Roster domain models.
//!
//! Provides the core data types for recurring volunteer work: the
//! day-of-month grid, recurrence rules, the people and jobs on the
//! roster, and the live and frozen rows the resolver draws on.
//!
//! # Source Mappings
//!
//! | u-roster | Role | Lifetime |
//! |-------------------|--------------------------------|---------------------|
//! | `Assignment` | recurring hold on a grid slot | live, editable |
//! | `Substitution` | one-date stand-in | live, editable |
//! | `VolunteerRecord` | who covered a job on a date | frozen history |
//! | `CustomerRecord` | meals delivered on a date | frozen history |
//! | `Actual` | resolver row over all of these | computed |

mod actual;
mod assignment;
mod day_of_month;
mod job;
mod people;
mod record;
mod recurrence;

pub use actual::Actual;
pub use assignment::{Assignment, Substitution};
pub use day_of_month::{is_weekend, DayOfMonth};
pub use job::{Job, JobKind};
pub use people::{Customer, DateRange, Volunteer};
pub use record::{CustomerRecord, ManagerAnnouncement, VolunteerRecord};
pub use recurrence::{ByDay, Freq, Recurrence, RecurrenceError, RuleSpec};
