//! Frozen history rows written by the daily snapshot.
//!
//! Records are write-once facts. Once a day has been snapshotted, its
//! records answer for it forever; reconfiguring schedules, deleting
//! people, or editing assignments later never rewrites what a record
//! says happened. References into live data are therefore nullable:
//! when a volunteer or job is removed, its records stay behind with the
//! reference blanked.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Who actually covered one job on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerRecord {
    pub id: String,
    /// Who did the work; `None` when the slot went uncovered or the
    /// volunteer was later removed.
    pub volunteer: Option<String>,
    pub job: Option<String>,
    pub date: NaiveDate,
    /// Who ordinarily holds the assignment.
    pub original: Option<String>,
    /// Whether the day was worked as a substitution.
    pub is_substitution: bool,
}

impl VolunteerRecord {
    pub fn new(id: impl Into<String>, job: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            volunteer: None,
            job: Some(job.into()),
            date,
            original: None,
            is_substitution: false,
        }
    }

    pub fn with_volunteer(mut self, volunteer: impl Into<String>) -> Self {
        self.volunteer = Some(volunteer.into());
        self
    }

    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = Some(original.into());
        self
    }

    pub fn as_substitution(mut self) -> Self {
        self.is_substitution = true;
        self
    }
}

/// How many meals one customer received on one date, with the payment
/// arrangement and route frozen as they stood that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: String,
    /// `None` after the customer is removed; the count still stands.
    pub customer: Option<String>,
    pub date: NaiveDate,
    pub num_meals: u32,
    pub payment: Option<String>,
    pub route: Option<String>,
}

impl CustomerRecord {
    pub fn new(
        id: impl Into<String>,
        customer: impl Into<String>,
        date: NaiveDate,
        num_meals: u32,
    ) -> Self {
        Self {
            id: id.into(),
            customer: Some(customer.into()),
            date,
            num_meals,
            payment: None,
            route: None,
        }
    }

    pub fn with_payment(mut self, payment: impl Into<String>) -> Self {
        self.payment = Some(payment.into());
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }
}

/// A staff notice shown until its display date passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerAnnouncement {
    pub id: String,
    pub message: String,
    /// Last date the notice is shown. Undated notices stay until
    /// removed by hand and are never pruned.
    pub display_until: Option<NaiveDate>,
}

impl ManagerAnnouncement {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            display_until: None,
        }
    }

    pub fn with_display_until(mut self, date: NaiveDate) -> Self {
        self.display_until = Some(date);
        self
    }
}

// ============================================================
// Tests
// ============================================================
