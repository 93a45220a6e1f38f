//! Structural validation for loaded rosters.
//!
//! The insert methods on [`Roster`] keep a live roster consistent; a
//! roster deserialized from stored data bypasses them all. These checks
//! catch what those methods would have refused:
//! - References to rows that do not exist
//! - Grid fields set one without the other, or out of range
//! - Substitutions dated off their assignment's slot, parked on an
//!   ad-hoc assignment, or naming the assignment's own volunteer
//! - Route jobs with no route number
//! - Recurrence rules whose entries contradict their frequency
//! - Pause ranges that end before they start

use chrono::Datelike;

use crate::models::{Freq, JobKind, Recurrence};
use crate::roster::Roster;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A row references an id that doesn't exist.
    MissingReference,
    /// A grid field is set without its partner.
    GridFieldMismatch,
    /// A weekday or week number outside its range.
    FieldOutOfRange,
    /// A substitution whose date doesn't land on its assignment's slot.
    SubstitutionDateMismatch,
    /// A substitution naming the volunteer it stands in for.
    SelfSubstitution,
    /// A route job with no place in the route order.
    MissingRouteNumber,
    /// A rule entry that contradicts its frequency.
    MalformedRule,
    /// A pause range ending before it starts.
    InvalidRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates every row of a roster.
///
/// Checks:
/// 1. Assignments point at existing jobs and volunteers
/// 2. Grid fields come in pairs and stay in range
/// 3. Substitutions point at existing rows, land on their slot, and
///    name someone other than the assignment's holder
/// 4. Records and pause ranges point at existing rows where set
/// 5. Route jobs carry a route number
/// 6. Recurrence entries fit their frequency
/// 7. Pause ranges run forward
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_roster(roster: &Roster) -> ValidationResult {
    let mut errors = Vec::new();

    for job in roster.jobs() {
        if job.kind == JobKind::Route && job.route_number.is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingRouteNumber,
                format!("Route job '{}' has no route number", job.id),
            ));
        }
        if let Some(recurrence) = &job.recurrence {
            check_rule_shapes(&format!("job '{}'", job.id), recurrence, &mut errors);
        }
    }

    for customer in roster.customers() {
        if let Some(route) = &customer.route {
            if roster.find_job(route).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingReference,
                    format!("Customer '{}' references unknown route '{route}'", customer.id),
                ));
            }
        }
        check_rule_shapes(
            &format!("customer '{}'", customer.id),
            &customer.meal_recurrence,
            &mut errors,
        );
    }

    for assignment in roster.assignments() {
        if roster.find_job(&assignment.job).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingReference,
                format!(
                    "Assignment '{}' references unknown job '{}'",
                    assignment.id, assignment.job
                ),
            ));
        }
        if let Some(volunteer) = &assignment.volunteer {
            if roster.find_volunteer(volunteer).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingReference,
                    format!(
                        "Assignment '{}' references unknown volunteer '{volunteer}'",
                        assignment.id
                    ),
                ));
            }
        }
        match (assignment.day_of_week, assignment.week_of_month) {
            (Some(day), Some(week)) => {
                if !(1..=7).contains(&day) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::FieldOutOfRange,
                        format!("Assignment '{}' has weekday {day} outside 1..=7", assignment.id),
                    ));
                }
                if !(1..=5).contains(&week) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::FieldOutOfRange,
                        format!("Assignment '{}' has week {week} outside 1..=5", assignment.id),
                    ));
                }
            }
            (None, None) => {}
            _ => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::GridFieldMismatch,
                    format!(
                        "Assignment '{}' sets only one of day_of_week and week_of_month",
                        assignment.id
                    ),
                ));
            }
        }
    }

    for substitution in roster.substitutions() {
        if let Some(volunteer) = &substitution.volunteer {
            if roster.find_volunteer(volunteer).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingReference,
                    format!(
                        "Substitution '{}' references unknown volunteer '{volunteer}'",
                        substitution.id
                    ),
                ));
            }
        }
        let parent = match roster.find_assignment(&substitution.assignment) {
            Some(parent) => parent,
            None => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingReference,
                    format!(
                        "Substitution '{}' references unknown assignment '{}'",
                        substitution.id, substitution.assignment
                    ),
                ));
                continue;
            }
        };
        if substitution.volunteer == parent.volunteer {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfSubstitution,
                format!(
                    "Substitution '{}' names the volunteer it stands in for",
                    substitution.id
                ),
            ));
        }
        let date = substitution.date;
        match parent.slot() {
            Some(slot) if slot.to_date(date.year(), date.month()) == Some(date) => {}
            Some(_) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SubstitutionDateMismatch,
                    format!("Substitution '{}' is dated off its slot", substitution.id),
                ));
            }
            None => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SubstitutionDateMismatch,
                    format!(
                        "Substitution '{}' sits on an assignment with no grid slot",
                        substitution.id
                    ),
                ));
            }
        }
    }

    for record in roster.volunteer_records() {
        for (field, reference) in [
            ("volunteer", &record.volunteer),
            ("original", &record.original),
        ] {
            if let Some(volunteer) = reference {
                if roster.find_volunteer(volunteer).is_none() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MissingReference,
                        format!(
                            "Record '{}' references unknown {field} '{volunteer}'",
                            record.id
                        ),
                    ));
                }
            }
        }
        if let Some(job) = &record.job {
            if roster.find_job(job).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingReference,
                    format!("Record '{}' references unknown job '{job}'", record.id),
                ));
            }
        }
    }

    for record in roster.customer_records() {
        if let Some(customer) = &record.customer {
            if roster.find_customer(customer).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingReference,
                    format!(
                        "Meal record '{}' references unknown customer '{customer}'",
                        record.id
                    ),
                ));
            }
        }
        if let Some(route) = &record.route {
            if roster.find_job(route).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingReference,
                    format!("Meal record '{}' references unknown route '{route}'", record.id),
                ));
            }
        }
    }

    for range in roster.date_ranges() {
        if roster.find_customer(&range.customer).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingReference,
                format!(
                    "Pause range '{}' references unknown customer '{}'",
                    range.id, range.customer
                ),
            ));
        }
        if range.start > range.end {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRange,
                format!("Pause range '{}' ends before it starts", range.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_rule_shapes(owner: &str, recurrence: &Recurrence, errors: &mut Vec<ValidationError>) {
    for rule in recurrence.rules.iter().chain(recurrence.exrules.iter()) {
        for entry in &rule.by_day {
            match (rule.freq, entry.ordinal) {
                (Freq::Weekly, Some(ordinal)) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MalformedRule,
                        format!("Weekly rule on {owner} carries week ordinal {ordinal}"),
                    ));
                }
                (Freq::Monthly, None) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MalformedRule,
                        format!("Monthly rule on {owner} lacks a week ordinal"),
                    ));
                }
                (Freq::Monthly, Some(ordinal)) if ordinal != -1 && !(1..=5).contains(&ordinal) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MalformedRule,
                        format!("Monthly rule on {owner} has week ordinal {ordinal}"),
                    ));
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use serde_json::json;

    use crate::models::{
        Assignment, ByDay, Customer, DateRange, DayOfMonth, Job, RuleSpec, Substitution, Volunteer,
    };

    use super::*;

    fn valid_roster() -> Roster {
        let mut roster = Roster::new();
        roster
            .insert_volunteer(Volunteer::new("ava", "Ava", "Price"))
            .unwrap();
        roster
            .insert_volunteer(Volunteer::new("ben", "Ben", "Kim"))
            .unwrap();
        roster.insert_job(Job::route("route7", "Route 7", 7)).unwrap();
        roster
            .insert_assignment(
                Assignment::grid("a1", "route7", DayOfMonth::new(1, 1).unwrap())
                    .with_volunteer("ava"),
            )
            .unwrap();
        roster
            .insert_substitution(
                Substitution::request(
                    "s1",
                    "a1",
                    chrono::NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
                )
                .with_volunteer("ben"),
            )
            .unwrap();
        roster
            .insert_customer(
                Customer::new("c1", "Grace", "Hopper")
                    .activated()
                    .with_recurrence(Recurrence::weekly([Weekday::Mon]))
                    .with_route("route7"),
            )
            .unwrap();
        roster
    }

    #[test]
    fn test_consistent_rosters_pass() {
        assert!(validate_roster(&valid_roster()).is_ok());
    }

    #[test]
    fn test_dangling_references_are_reported() {
        let roster: Roster = serde_json::from_value(json!({
            "volunteers": {},
            "customers": {},
            "jobs": {},
            "assignments": {
                "a1": {
                    "id": "a1",
                    "volunteer": "ghost",
                    "job": "nowhere",
                    "day_of_week": 1,
                    "week_of_month": 1
                }
            },
            "substitutions": {},
            "volunteer_records": {},
            "customer_records": {},
            "date_ranges": {},
            "announcements": {}
        }))
        .unwrap();

        let errors = validate_roster(&roster).unwrap_err();
        let missing = errors
            .iter()
            .filter(|error| error.kind == ValidationErrorKind::MissingReference)
            .count();
        assert_eq!(missing, 2);
    }

    #[test]
    fn test_half_set_grid_fields_are_flagged() {
        let roster: Roster = serde_json::from_value(json!({
            "volunteers": {},
            "customers": {},
            "jobs": {
                "j1": {
                    "id": "j1",
                    "name": "Hot Packer",
                    "kind": "Packer",
                    "num_vols_required": 1,
                    "route_number": null,
                    "recurrence": null
                }
            },
            "assignments": {
                "a1": {
                    "id": "a1",
                    "volunteer": null,
                    "job": "j1",
                    "day_of_week": 1,
                    "week_of_month": null
                }
            },
            "substitutions": {},
            "volunteer_records": {},
            "customer_records": {},
            "date_ranges": {},
            "announcements": {}
        }))
        .unwrap();

        let errors = validate_roster(&roster).unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.kind == ValidationErrorKind::GridFieldMismatch));
    }

    #[test]
    fn test_out_of_range_grid_fields_are_flagged() {
        let roster: Roster = serde_json::from_value(json!({
            "volunteers": {},
            "customers": {},
            "jobs": {
                "j1": {
                    "id": "j1",
                    "name": "Hot Packer",
                    "kind": "Packer",
                    "num_vols_required": 1,
                    "route_number": null,
                    "recurrence": null
                }
            },
            "assignments": {
                "a1": {
                    "id": "a1",
                    "volunteer": null,
                    "job": "j1",
                    "day_of_week": 9,
                    "week_of_month": 1
                }
            },
            "substitutions": {},
            "volunteer_records": {},
            "customer_records": {},
            "date_ranges": {},
            "announcements": {}
        }))
        .unwrap();

        let errors = validate_roster(&roster).unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.kind == ValidationErrorKind::FieldOutOfRange));
    }

    #[test]
    fn test_substitutions_dated_off_their_slot_are_flagged() {
        let roster: Roster = serde_json::from_value(json!({
            "volunteers": {
                "ava": {"id": "ava", "first_name": "Ava", "last_name": "Price", "phone": null}
            },
            "customers": {},
            "jobs": {
                "j1": {
                    "id": "j1",
                    "name": "Route 7",
                    "kind": "Route",
                    "num_vols_required": 1,
                    "route_number": 7,
                    "recurrence": null
                }
            },
            "assignments": {
                "a1": {
                    "id": "a1",
                    "volunteer": "ava",
                    "job": "j1",
                    "day_of_week": 1,
                    "week_of_month": 1
                }
            },
            "substitutions": {
                // 2020-03-03 is a Tuesday; the slot is first Mondays.
                "s1": {"id": "s1", "volunteer": null, "assignment": "a1", "date": "2020-03-03"}
            },
            "volunteer_records": {},
            "customer_records": {},
            "date_ranges": {},
            "announcements": {}
        }))
        .unwrap();

        let errors = validate_roster(&roster).unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.kind == ValidationErrorKind::SubstitutionDateMismatch));
    }

    #[test]
    fn test_self_substitutions_are_flagged() {
        let roster: Roster = serde_json::from_value(json!({
            "volunteers": {
                "ava": {"id": "ava", "first_name": "Ava", "last_name": "Price", "phone": null}
            },
            "customers": {},
            "jobs": {
                "j1": {
                    "id": "j1",
                    "name": "Route 7",
                    "kind": "Route",
                    "num_vols_required": 1,
                    "route_number": 7,
                    "recurrence": null
                }
            },
            "assignments": {
                "a1": {
                    "id": "a1",
                    "volunteer": "ava",
                    "job": "j1",
                    "day_of_week": 1,
                    "week_of_month": 1
                }
            },
            "substitutions": {
                "s1": {"id": "s1", "volunteer": "ava", "assignment": "a1", "date": "2020-03-02"}
            },
            "volunteer_records": {},
            "customer_records": {},
            "date_ranges": {},
            "announcements": {}
        }))
        .unwrap();

        let errors = validate_roster(&roster).unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.kind == ValidationErrorKind::SelfSubstitution));
    }

    #[test]
    fn test_route_jobs_need_route_numbers() {
        let mut roster = Roster::new();
        roster
            .insert_job(Job::new("j1", "Route 7", JobKind::Route))
            .unwrap();
        let errors = validate_roster(&roster).unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.kind == ValidationErrorKind::MissingRouteNumber));
    }

    #[test]
    fn test_rule_entries_must_fit_their_frequency() {
        let mut roster = Roster::new();
        let weekly_with_ordinal = Recurrence::new().with_rule(RuleSpec {
            freq: Freq::Weekly,
            by_day: vec![ByDay {
                ordinal: Some(2),
                weekday: Weekday::Mon,
            }],
        });
        roster
            .insert_customer(
                Customer::new("c1", "Grace", "Hopper").with_recurrence(weekly_with_ordinal),
            )
            .unwrap();

        let monthly_without_ordinal = Recurrence::new().with_rule(RuleSpec {
            freq: Freq::Monthly,
            by_day: vec![ByDay {
                ordinal: None,
                weekday: Weekday::Tue,
            }],
        });
        roster
            .insert_job(
                Job::new("j1", "Pantry Run", JobKind::Packer)
                    .with_recurrence(monthly_without_ordinal),
            )
            .unwrap();

        let errors = validate_roster(&roster).unwrap_err();
        let malformed = errors
            .iter()
            .filter(|error| error.kind == ValidationErrorKind::MalformedRule)
            .count();
        assert_eq!(malformed, 2);
    }

    #[test]
    fn test_backwards_pause_ranges_are_flagged() {
        let mut roster = Roster::new();
        roster
            .insert_customer(Customer::new("c1", "Grace", "Hopper"))
            .unwrap();
        roster
            .insert_date_range(DateRange::new(
                "dr1",
                "c1",
                chrono::NaiveDate::from_ymd_opt(2020, 3, 9).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
            ))
            .unwrap();
        let errors = validate_roster(&roster).unwrap_err();
        assert!(errors
            .iter()
            .any(|error| error.kind == ValidationErrorKind::InvalidRange));
    }

    #[test]
    fn test_all_errors_are_collected_in_one_pass() {
        let roster: Roster = serde_json::from_value(json!({
            "volunteers": {},
            "customers": {},
            "jobs": {
                "j1": {
                    "id": "j1",
                    "name": "Route 7",
                    "kind": "Route",
                    "num_vols_required": 1,
                    "route_number": null,
                    "recurrence": null
                }
            },
            "assignments": {
                "a1": {
                    "id": "a1",
                    "volunteer": "ghost",
                    "job": "j1",
                    "day_of_week": null,
                    "week_of_month": 3
                }
            },
            "substitutions": {},
            "volunteer_records": {},
            "customer_records": {},
            "date_ranges": {},
            "announcements": {}
        }))
        .unwrap();

        let errors = validate_roster(&roster).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
