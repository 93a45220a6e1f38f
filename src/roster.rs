//! In-memory store for the roster's relational rows.
//!
//! [`Roster`] provides what the engine expects from a backing store:
//! keyed lookup, insertion guarded by reference and uniqueness checks,
//! and removal with per-relation semantics. Deleting a person never
//! tears down history; rows that pointed at them keep standing with the
//! reference blanked. Deleting a job takes its assignments (and their
//! substitutions) with it, because an assignment without a job means
//! nothing.
//!
//! Uniqueness rules only bind fully-populated keys. A tuple with any
//! unset component is exempt, so two open slots on the same grid
//! position coexist, as do two unfilled requests for the same date.
//! That is the behavior of a composite unique index over nullable
//! columns, and the roster keeps it because the operation relies on it.
//!
//! Lookups come in two flavors. The named getters ([`Roster::volunteer`]
//! and friends) return [`RosterError::NotFound`] for a missing id and
//! are for callers holding a reference they believe valid. The `find_*`
//! variants return `Option` where absence is an ordinary answer.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    Actual, Assignment, Customer, CustomerRecord, DateRange, DayOfMonth, Job, ManagerAnnouncement,
    Recurrence, Substitution, Volunteer, VolunteerRecord,
};

/// Store-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RosterError {
    /// A referenced row does not exist.
    #[error("{kind} {id:?} not found")]
    NotFound { kind: &'static str, id: String },
    /// An insert collided with a uniqueness rule.
    #[error("{0}")]
    Constraint(String),
    /// A write failed its consistency checks.
    #[error("{0}")]
    Validation(String),
}

impl RosterError {
    fn not_found(kind: &'static str, id: &str) -> Self {
        RosterError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// The whole roster: people, jobs, live scheduling rows, and frozen
/// history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    volunteers: BTreeMap<String, Volunteer>,
    customers: BTreeMap<String, Customer>,
    jobs: BTreeMap<String, Job>,
    assignments: BTreeMap<String, Assignment>,
    substitutions: BTreeMap<String, Substitution>,
    volunteer_records: BTreeMap<String, VolunteerRecord>,
    customer_records: BTreeMap<String, CustomerRecord>,
    date_ranges: BTreeMap<String, DateRange>,
    announcements: BTreeMap<String, ManagerAnnouncement>,
    #[serde(default)]
    next_id: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh id with the given prefix.
    pub fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    // ============================================================
    // Getters
    // ============================================================

    pub fn volunteer(&self, id: &str) -> Result<&Volunteer, RosterError> {
        self.volunteers
            .get(id)
            .ok_or_else(|| RosterError::not_found("volunteer", id))
    }

    pub fn customer(&self, id: &str) -> Result<&Customer, RosterError> {
        self.customers
            .get(id)
            .ok_or_else(|| RosterError::not_found("customer", id))
    }

    pub fn job(&self, id: &str) -> Result<&Job, RosterError> {
        self.jobs
            .get(id)
            .ok_or_else(|| RosterError::not_found("job", id))
    }

    pub fn assignment(&self, id: &str) -> Result<&Assignment, RosterError> {
        self.assignments
            .get(id)
            .ok_or_else(|| RosterError::not_found("assignment", id))
    }

    pub fn substitution(&self, id: &str) -> Result<&Substitution, RosterError> {
        self.substitutions
            .get(id)
            .ok_or_else(|| RosterError::not_found("substitution", id))
    }

    pub fn find_volunteer(&self, id: &str) -> Option<&Volunteer> {
        self.volunteers.get(id)
    }

    pub fn find_customer(&self, id: &str) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn find_job(&self, id: &str) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn find_assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.get(id)
    }

    // ============================================================
    // Iteration
    // ============================================================

    pub fn volunteers(&self) -> impl Iterator<Item = &Volunteer> {
        self.volunteers.values()
    }

    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    pub fn substitutions(&self) -> impl Iterator<Item = &Substitution> {
        self.substitutions.values()
    }

    pub fn volunteer_records(&self) -> impl Iterator<Item = &VolunteerRecord> {
        self.volunteer_records.values()
    }

    pub fn customer_records(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.customer_records.values()
    }

    pub fn date_ranges(&self) -> impl Iterator<Item = &DateRange> {
        self.date_ranges.values()
    }

    pub fn announcements(&self) -> impl Iterator<Item = &ManagerAnnouncement> {
        self.announcements.values()
    }

    // ============================================================
    // Filtered views
    // ============================================================

    /// Grid assignments sitting on the given position.
    pub fn assignments_on_slot(&self, slot: DayOfMonth) -> impl Iterator<Item = &Assignment> + '_ {
        self.assignments
            .values()
            .filter(move |assignment| assignment.slot() == Some(slot))
    }

    /// Assignments governed by their job's own recurrence.
    pub fn ad_hoc_assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments
            .values()
            .filter(|assignment| assignment.is_ad_hoc())
    }

    pub fn assignments_for_volunteer<'a>(
        &'a self,
        volunteer: &'a str,
    ) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments
            .values()
            .filter(move |assignment| assignment.volunteer.as_deref() == Some(volunteer))
    }

    pub fn substitutions_for_volunteer<'a>(
        &'a self,
        volunteer: &'a str,
    ) -> impl Iterator<Item = &'a Substitution> + 'a {
        self.substitutions
            .values()
            .filter(move |substitution| substitution.volunteer.as_deref() == Some(volunteer))
    }

    /// Whether any substitution, filled or not, pins this assignment on
    /// this date.
    pub fn substitution_on(&self, assignment: &str, date: NaiveDate) -> bool {
        self.substitutions
            .values()
            .any(|substitution| substitution.assignment == assignment && substitution.date == date)
    }

    pub fn volunteer_records_on(&self, date: NaiveDate) -> impl Iterator<Item = &VolunteerRecord> + '_ {
        self.volunteer_records
            .values()
            .filter(move |record| record.date == date)
    }

    /// The history row matching a resolver row exactly, if one exists.
    pub fn volunteer_record_matching(&self, actual: &Actual) -> Option<&VolunteerRecord> {
        self.volunteer_records
            .values()
            .find(|record| Actual::from_record(record) == *actual)
    }

    /// The meal record for one customer on one date. Absence means no
    /// meal was recorded, which is an ordinary answer.
    pub fn customer_record_for(&self, customer: &str, date: NaiveDate) -> Option<&CustomerRecord> {
        self.customer_records
            .values()
            .find(|record| record.customer.as_deref() == Some(customer) && record.date == date)
    }

    pub fn date_ranges_for<'a>(
        &'a self,
        customer: &'a str,
    ) -> impl Iterator<Item = &'a DateRange> + 'a {
        self.date_ranges
            .values()
            .filter(move |range| range.customer == customer)
    }

    // ============================================================
    // Inserts
    // ============================================================

    pub fn insert_volunteer(&mut self, volunteer: Volunteer) -> Result<(), RosterError> {
        if self.volunteers.contains_key(&volunteer.id) {
            return Err(RosterError::Constraint(format!(
                "volunteer id {:?} already exists",
                volunteer.id
            )));
        }
        self.volunteers.insert(volunteer.id.clone(), volunteer);
        Ok(())
    }

    pub fn insert_customer(&mut self, customer: Customer) -> Result<(), RosterError> {
        if self.customers.contains_key(&customer.id) {
            return Err(RosterError::Constraint(format!(
                "customer id {:?} already exists",
                customer.id
            )));
        }
        if let Some(route) = &customer.route {
            self.job(route)?;
        }
        self.customers.insert(customer.id.clone(), customer);
        Ok(())
    }

    pub fn insert_job(&mut self, job: Job) -> Result<(), RosterError> {
        if self.jobs.contains_key(&job.id) {
            return Err(RosterError::Constraint(format!(
                "job id {:?} already exists",
                job.id
            )));
        }
        if self.jobs.values().any(|existing| existing.name == job.name) {
            return Err(RosterError::Constraint(format!(
                "job name {:?} already exists",
                job.name
            )));
        }
        if let Some(number) = job.route_number {
            if self
                .jobs
                .values()
                .any(|existing| existing.route_number == Some(number))
            {
                return Err(RosterError::Constraint(format!(
                    "route number {number} already exists"
                )));
            }
        }
        self.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    pub fn insert_date_range(&mut self, range: DateRange) -> Result<(), RosterError> {
        if self.date_ranges.contains_key(&range.id) {
            return Err(RosterError::Constraint(format!(
                "date range id {:?} already exists",
                range.id
            )));
        }
        self.customer(&range.customer)?;
        self.date_ranges.insert(range.id.clone(), range);
        Ok(())
    }

    pub fn insert_assignment(&mut self, assignment: Assignment) -> Result<(), RosterError> {
        if self.assignments.contains_key(&assignment.id) {
            return Err(RosterError::Constraint(format!(
                "assignment id {:?} already exists",
                assignment.id
            )));
        }
        self.job(&assignment.job)?;
        if let Some(volunteer) = &assignment.volunteer {
            self.volunteer(volunteer)?;
        }
        // The (job, volunteer, slot) key only binds when every part is
        // set; open slots and ad-hoc rows may repeat.
        if assignment.volunteer.is_some() {
            if let Some(slot) = assignment.slot() {
                let duplicate = self.assignments.values().any(|existing| {
                    existing.job == assignment.job
                        && existing.volunteer == assignment.volunteer
                        && existing.slot() == Some(slot)
                });
                if duplicate {
                    return Err(RosterError::Constraint(format!(
                        "assignment of {:?} to {:?} on the {slot} already exists",
                        assignment.volunteer.as_deref().unwrap_or_default(),
                        assignment.job,
                    )));
                }
            }
        }
        self.assignments.insert(assignment.id.clone(), assignment);
        Ok(())
    }

    pub fn insert_substitution(&mut self, substitution: Substitution) -> Result<(), RosterError> {
        if self.substitutions.contains_key(&substitution.id) {
            return Err(RosterError::Constraint(format!(
                "substitution id {:?} already exists",
                substitution.id
            )));
        }
        let parent = self.assignment(&substitution.assignment)?;
        let parent_volunteer = parent.volunteer.clone();
        let parent_slot = parent.slot();
        if let Some(volunteer) = &substitution.volunteer {
            self.volunteer(volunteer)?;
        }
        // A substitution only makes sense on a date its assignment
        // actually runs.
        match parent_slot {
            Some(slot) => {
                let scheduled =
                    slot.to_date(substitution.date.year(), substitution.date.month());
                if scheduled != Some(substitution.date) {
                    return Err(RosterError::Validation(format!(
                        "substitution date {} does not fall on the {slot}",
                        substitution.date
                    )));
                }
            }
            None => {
                return Err(RosterError::Validation(format!(
                    "assignment {:?} runs on its own schedule and takes no substitutions",
                    substitution.assignment
                )));
            }
        }
        // Covers the both-unset case too: an open slot needs no
        // substitute request naming nobody.
        if substitution.volunteer == parent_volunteer {
            return Err(RosterError::Validation(
                "substitute and original volunteer cannot be the same".to_string(),
            ));
        }
        if substitution.volunteer.is_some() {
            let duplicate = self.substitutions.values().any(|existing| {
                existing.volunteer == substitution.volunteer
                    && existing.assignment == substitution.assignment
                    && existing.date == substitution.date
            });
            if duplicate {
                return Err(RosterError::Constraint(format!(
                    "substitution by {:?} for assignment {:?} on {} already exists",
                    substitution.volunteer.as_deref().unwrap_or_default(),
                    substitution.assignment,
                    substitution.date,
                )));
            }
        }
        self.substitutions
            .insert(substitution.id.clone(), substitution);
        Ok(())
    }

    pub fn insert_volunteer_record(&mut self, record: VolunteerRecord) -> Result<(), RosterError> {
        if self.volunteer_records.contains_key(&record.id) {
            return Err(RosterError::Constraint(format!(
                "volunteer record id {:?} already exists",
                record.id
            )));
        }
        if let Some(volunteer) = &record.volunteer {
            self.volunteer(volunteer)?;
        }
        if let Some(original) = &record.original {
            self.volunteer(original)?;
        }
        if let Some(job) = &record.job {
            self.job(job)?;
        }
        if record.volunteer.is_some() && record.job.is_some() {
            let duplicate = self.volunteer_records.values().any(|existing| {
                existing.volunteer == record.volunteer
                    && existing.job == record.job
                    && existing.date == record.date
            });
            if duplicate {
                return Err(RosterError::Constraint(format!(
                    "volunteer record for {:?} on {:?} at {} already exists",
                    record.volunteer.as_deref().unwrap_or_default(),
                    record.job.as_deref().unwrap_or_default(),
                    record.date,
                )));
            }
        }
        self.volunteer_records.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn insert_customer_record(&mut self, record: CustomerRecord) -> Result<(), RosterError> {
        if self.customer_records.contains_key(&record.id) {
            return Err(RosterError::Constraint(format!(
                "customer record id {:?} already exists",
                record.id
            )));
        }
        if let Some(customer) = &record.customer {
            self.customer(customer)?;
        }
        if record.customer.is_some() {
            let duplicate = self.customer_records.values().any(|existing| {
                existing.customer == record.customer && existing.date == record.date
            });
            if duplicate {
                return Err(RosterError::Constraint(format!(
                    "customer record for {:?} on {} already exists",
                    record.customer.as_deref().unwrap_or_default(),
                    record.date,
                )));
            }
        }
        self.customer_records.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn insert_announcement(&mut self, notice: ManagerAnnouncement) -> Result<(), RosterError> {
        if self.announcements.contains_key(&notice.id) {
            return Err(RosterError::Constraint(format!(
                "announcement id {:?} already exists",
                notice.id
            )));
        }
        self.announcements.insert(notice.id.clone(), notice);
        Ok(())
    }

    /// Updates the record keyed by `(customer, date)` or creates it,
    /// freezing the meal count with the customer's current payment and
    /// route. Returns true when a new row was created.
    pub fn upsert_customer_record(
        &mut self,
        customer: &Customer,
        date: NaiveDate,
        num_meals: u32,
    ) -> Result<bool, RosterError> {
        self.customer(&customer.id)?;
        let existing = self
            .customer_records
            .values()
            .find(|record| {
                record.customer.as_deref() == Some(customer.id.as_str()) && record.date == date
            })
            .map(|record| record.id.clone());
        match existing {
            Some(id) => {
                if let Some(record) = self.customer_records.get_mut(&id) {
                    record.num_meals = num_meals;
                    record.payment = customer.payment.clone();
                    record.route = customer.route.clone();
                }
                Ok(false)
            }
            None => {
                let id = self.allocate_id("customer-record");
                let mut record = CustomerRecord::new(id, &customer.id, date, num_meals);
                record.payment = customer.payment.clone();
                record.route = customer.route.clone();
                self.insert_customer_record(record)?;
                Ok(true)
            }
        }
    }

    // ============================================================
    // Removals
    // ============================================================

    /// Removes a volunteer; every row that pointed at them stays with
    /// the reference blanked.
    pub fn remove_volunteer(&mut self, id: &str) -> Result<Volunteer, RosterError> {
        let volunteer = self
            .volunteers
            .remove(id)
            .ok_or_else(|| RosterError::not_found("volunteer", id))?;
        for assignment in self.assignments.values_mut() {
            if assignment.volunteer.as_deref() == Some(id) {
                assignment.volunteer = None;
            }
        }
        for substitution in self.substitutions.values_mut() {
            if substitution.volunteer.as_deref() == Some(id) {
                substitution.volunteer = None;
            }
        }
        for record in self.volunteer_records.values_mut() {
            if record.volunteer.as_deref() == Some(id) {
                record.volunteer = None;
            }
            if record.original.as_deref() == Some(id) {
                record.original = None;
            }
        }
        Ok(volunteer)
    }

    /// Removes a customer along with their pause windows; meal records
    /// stay with the reference blanked.
    pub fn remove_customer(&mut self, id: &str) -> Result<Customer, RosterError> {
        let customer = self
            .customers
            .remove(id)
            .ok_or_else(|| RosterError::not_found("customer", id))?;
        self.date_ranges.retain(|_, range| range.customer != id);
        for record in self.customer_records.values_mut() {
            if record.customer.as_deref() == Some(id) {
                record.customer = None;
            }
        }
        Ok(customer)
    }

    /// Removes a job along with its assignments and their
    /// substitutions; history rows and customers that pointed at it
    /// keep standing with the reference blanked.
    pub fn remove_job(&mut self, id: &str) -> Result<Job, RosterError> {
        let job = self
            .jobs
            .remove(id)
            .ok_or_else(|| RosterError::not_found("job", id))?;
        let doomed: Vec<String> = self
            .assignments
            .values()
            .filter(|assignment| assignment.job == id)
            .map(|assignment| assignment.id.clone())
            .collect();
        for assignment_id in &doomed {
            self.substitutions
                .retain(|_, substitution| &substitution.assignment != assignment_id);
            self.assignments.remove(assignment_id);
        }
        for record in self.volunteer_records.values_mut() {
            if record.job.as_deref() == Some(id) {
                record.job = None;
            }
        }
        for customer in self.customers.values_mut() {
            if customer.route.as_deref() == Some(id) {
                customer.route = None;
            }
        }
        for record in self.customer_records.values_mut() {
            if record.route.as_deref() == Some(id) {
                record.route = None;
            }
        }
        Ok(job)
    }

    /// Removes an assignment along with its substitutions.
    pub fn remove_assignment(&mut self, id: &str) -> Result<Assignment, RosterError> {
        let assignment = self
            .assignments
            .remove(id)
            .ok_or_else(|| RosterError::not_found("assignment", id))?;
        self.substitutions
            .retain(|_, substitution| substitution.assignment != id);
        Ok(assignment)
    }

    pub fn remove_substitution(&mut self, id: &str) -> Result<Substitution, RosterError> {
        self.substitutions
            .remove(id)
            .ok_or_else(|| RosterError::not_found("substitution", id))
    }

    pub fn remove_volunteer_record(&mut self, id: &str) -> Result<VolunteerRecord, RosterError> {
        self.volunteer_records
            .remove(id)
            .ok_or_else(|| RosterError::not_found("volunteer record", id))
    }

    pub fn remove_customer_record(&mut self, id: &str) -> Result<CustomerRecord, RosterError> {
        self.customer_records
            .remove(id)
            .ok_or_else(|| RosterError::not_found("customer record", id))
    }

    pub fn remove_date_range(&mut self, id: &str) -> Result<DateRange, RosterError> {
        self.date_ranges
            .remove(id)
            .ok_or_else(|| RosterError::not_found("date range", id))
    }

    pub fn remove_announcement(&mut self, id: &str) -> Result<ManagerAnnouncement, RosterError> {
        self.announcements
            .remove(id)
            .ok_or_else(|| RosterError::not_found("announcement", id))
    }

    // ============================================================
    // Seeding
    // ============================================================

    /// Expands a recurrence into grid positions and creates one
    /// assignment per position, all held by the same volunteer (or all
    /// open). Raises the job's required-volunteer count to the largest
    /// population any of its slots reaches. On any failure the whole
    /// batch is rolled back.
    pub fn seed_assignments(
        &mut self,
        volunteer: Option<&str>,
        job: &str,
        recurrence: &Recurrence,
    ) -> Result<Vec<String>, RosterError> {
        let prior_required = self.job(job)?.num_vols_required;
        if let Some(volunteer) = volunteer {
            self.volunteer(volunteer)?;
        }
        let positions: Vec<DayOfMonth> = recurrence.day_positions().collect();
        let mut created = Vec::new();
        for slot in positions {
            let id = self.allocate_id("assignment");
            let mut assignment = Assignment::grid(&id, job, slot);
            if let Some(volunteer) = volunteer {
                assignment = assignment.with_volunteer(volunteer);
            }
            if let Err(err) = self.insert_assignment(assignment) {
                for id in &created {
                    self.assignments.remove(id);
                }
                if let Some(entry) = self.jobs.get_mut(job) {
                    entry.num_vols_required = prior_required;
                }
                return Err(err);
            }
            created.push(id);
            let filled = self
                .assignments
                .values()
                .filter(|assignment| assignment.job == job && assignment.slot() == Some(slot))
                .count() as u32;
            if let Some(entry) = self.jobs.get_mut(job) {
                if filled > entry.num_vols_required {
                    entry.num_vols_required = filled;
                }
            }
        }
        Ok(created)
    }
}

// ============================================================
// Tests
// ============================================================
