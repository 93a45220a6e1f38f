//! The resolver's output row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::assignment::{Assignment, Substitution};
use super::record::VolunteerRecord;

/// Who is actually covering one job on one date.
///
/// One shape unifies the three sources of truth: live grid and ad-hoc
/// assignments, date-pinned substitutions, and frozen history rows.
/// `volunteer` is who shows up, `original` who ordinarily holds the
/// assignment; they coincide on plain assignment rows.
///
/// `volunteer: None` is an honest but lossy reading. It can mean an
/// open slot nobody has claimed, a substitution request still waiting
/// for a taker, or a volunteer deleted after the fact; only
/// `is_substitution` and the surrounding context distinguish them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actual {
    pub volunteer: Option<String>,
    pub job: Option<String>,
    pub date: NaiveDate,
    pub original: Option<String>,
    pub is_substitution: bool,
}

impl Actual {
    /// Projects a live assignment onto a concrete date.
    pub fn from_assignment(assignment: &Assignment, date: NaiveDate) -> Self {
        Self {
            volunteer: assignment.volunteer.clone(),
            job: Some(assignment.job.clone()),
            date,
            original: assignment.volunteer.clone(),
            is_substitution: false,
        }
    }

    /// Projects a substitution through its parent assignment.
    pub fn from_substitution(substitution: &Substitution, parent: &Assignment) -> Self {
        Self {
            volunteer: substitution.volunteer.clone(),
            job: Some(parent.job.clone()),
            date: substitution.date,
            original: parent.volunteer.clone(),
            is_substitution: true,
        }
    }

    /// Reads a frozen history row verbatim.
    pub fn from_record(record: &VolunteerRecord) -> Self {
        Self {
            volunteer: record.volunteer.clone(),
            job: record.job.clone(),
            date: record.date,
            original: record.original.clone(),
            is_substitution: record.is_substitution,
        }
    }

    /// Freezes this row into a history record under the given id.
    pub fn to_record(&self, id: impl Into<String>) -> VolunteerRecord {
        VolunteerRecord {
            id: id.into(),
            volunteer: self.volunteer.clone(),
            job: self.job.clone(),
            date: self.date,
            original: self.original.clone(),
            is_substitution: self.is_substitution,
        }
    }
}

// ============================================================
// Tests
// ============================================================
