//! Customer meal eligibility: whether and how much to deliver on a day.
//!
//! Eligibility layers four checks on top of a customer's meal
//! recurrence, in order:
//!
//! 1. Weekends never see deliveries. Weekend needs are covered by
//!    extra meals sent out on the configured bonus weekday instead.
//! 2. Inactive customers receive nothing, whatever their recurrence
//!    says.
//! 3. The recurrence itself must name the day.
//! 4. A pause range covering the day suppresses delivery.
//!
//! [`num_meals_on_day`] adds the time split the rest of the engine
//! uses: past days answer from frozen [`CustomerRecord`] rows and
//! ignore the live checks entirely, today and later run them.
//!
//! [`CustomerRecord`]: crate::models::CustomerRecord

use chrono::{Datelike, NaiveDate};

use crate::context::{EngineConfig, EngineContext};
use crate::models::{is_weekend, Customer};
use crate::roster::Roster;

/// Whether any pause range for the customer covers the date.
pub fn excluded_by_date_range(roster: &Roster, customer: &str, date: NaiveDate) -> bool {
    roster
        .date_ranges_for(customer)
        .any(|range| range.contains(date))
}

/// Whether the customer is due a delivery on the date.
///
/// This is the live-side rule only; it knows nothing about records.
/// Use [`num_meals_on_day`] when the date may lie in the past.
pub fn receives_meal_on_date(
    roster: &Roster,
    customer: &Customer,
    date: NaiveDate,
    config: &EngineConfig,
) -> bool {
    if is_weekend(date) {
        return false;
    }
    if !customer.active {
        return false;
    }
    if !customer.meal_recurrence.occurs_on(date, config.rule_epoch) {
        return false;
    }
    !excluded_by_date_range(roster, &customer.id, date)
}

/// The number of meals the customer gets on the date.
///
/// Past dates answer from the frozen record for that day, or zero when
/// none was written. Today and future dates apply
/// [`receives_meal_on_date`], then add the customer's weekend meals on
/// the configured bonus weekday.
pub fn num_meals_on_day(
    roster: &Roster,
    customer: &Customer,
    date: NaiveDate,
    ctx: &EngineContext,
) -> u32 {
    if is_weekend(date) {
        return 0;
    }
    if date < ctx.today {
        return roster
            .customer_record_for(&customer.id, date)
            .map(|record| record.num_meals)
            .unwrap_or(0);
    }
    if !receives_meal_on_date(roster, customer, date, &ctx.config) {
        return 0;
    }
    let mut meals = 1;
    if date.weekday() == ctx.config.bonus_weekday {
        meals += customer.num_weekend_meals;
    }
    meals
}
