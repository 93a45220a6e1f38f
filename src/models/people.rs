//! People: volunteers who run jobs, customers who receive meals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::recurrence::Recurrence;

/// A volunteer who can hold recurring assignments and stand in as a
/// substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Preferred contact number.
    pub phone: Option<String>,
}

impl Volunteer {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A meal recipient.
///
/// The delivery schedule lives on `meal_recurrence` as weekday rules;
/// a customer gets at most one meal per weekday, plus the weekend-bonus
/// meals carried on the configured bonus run. New customers start
/// inactive so nothing is delivered until staff switch them on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Inactive customers never receive meals.
    pub active: bool,
    /// When deliveries happen. Empty means never.
    pub meal_recurrence: Recurrence,
    /// Extra meals delivered alongside the weekend-bonus run.
    pub num_weekend_meals: u32,
    /// Payment arrangement label, frozen into each day's record.
    pub payment: Option<String>,
    /// Route job currently delivering to this customer.
    pub route: Option<String>,
}

impl Customer {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            active: false,
            meal_recurrence: Recurrence::new(),
            num_weekend_meals: 0,
            payment: None,
            route: None,
        }
    }

    /// Switches the customer on.
    pub fn activated(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.meal_recurrence = recurrence;
        self
    }

    pub fn with_weekend_meals(mut self, num: u32) -> Self {
        self.num_weekend_meals = num;
        self
    }

    pub fn with_payment(mut self, payment: impl Into<String>) -> Self {
        self.payment = Some(payment.into());
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A window during which a customer's deliveries are paused, for a
/// hospital stay, travel, and the like. Both ends are inclusive, so a
/// single-day pause has `start == end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub id: String,
    pub customer: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(
        id: impl Into<String>,
        customer: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            customer: customer.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ============================================================
// Tests
// ============================================================
